//! ASCII tree rendering for the roadmap's modules and features.

use crate::models::{Module, Status};

const PLANNED: char = '◇';
const IN_PROGRESS: char = '○';
const COMPLETED: char = '●';
const ON_HOLD: char = '✗';

/// Get the status symbol for a roadmap status.
fn status_symbol(status: Status) -> char {
    match status {
        Status::Planned => PLANNED,
        Status::InProgress => IN_PROGRESS,
        Status::Completed => COMPLETED,
        Status::OnHold => ON_HOLD,
    }
}

/// Render modules and their features as ASCII art with status symbols.
///
/// Example output:
/// ```text
/// ○ EHB Wallet (45%)
/// ├── ○ Payment Processing
/// └── ◇ Transaction History
/// ✗ Content Moderation (20%)
/// ```
pub fn render_roadmap(modules: &[Module]) -> String {
    let mut output = String::new();
    for module in modules {
        render_module(&mut output, module);
    }
    output
}

fn render_module(output: &mut String, module: &Module) {
    output.push(status_symbol(module.status));
    output.push(' ');
    output.push_str(&module.title);
    output.push_str(&format!(" ({}%)\n", module.progress));

    for (i, feature) in module.features.iter().enumerate() {
        let is_last = i == module.features.len() - 1;
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(branch);
        output.push(status_symbol(feature.status));
        output.push(' ');
        output.push_str(&feature.title);
        output.push('\n');
    }
}
