//! The built-in EHB platform roadmap, used to seed a fresh database.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::*;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

fn tags(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|t| t.to_string()).collect()
}

fn feature(id: &str, title: &str, description: &str, status: Status, priority: Priority) -> Feature {
    Feature {
        id: id.to_string(),
        title: title.to_string(),
        description: Some(description.to_string()),
        status,
        priority: Some(priority),
        tags: BTreeSet::new(),
    }
}

/// The roadmap the platform ships with.
pub fn default_dataset() -> Dataset {
    Dataset {
        modules: vec![
            Module {
                id: "core-platform".to_string(),
                title: "Core Platform".to_string(),
                description: Some(
                    "Shared services every module builds on: identity, notifications and the admin console."
                        .to_string(),
                ),
                status: Status::InProgress,
                priority: Some(Priority::Critical),
                tags: tags(&["infrastructure", "identity"]),
                progress: 70,
                owner: Some("Platform Team".to_string()),
                start_date: Some(date(2024, 1, 15)),
                end_date: Some(date(2024, 9, 30)),
                features: vec![
                    feature(
                        "single-sign-on",
                        "Single Sign-On",
                        "One account across every EHB service.",
                        Status::Completed,
                        Priority::Critical,
                    ),
                    feature(
                        "notification-center",
                        "Notification Center",
                        "In-app, email and SMS alerts with per-user preferences.",
                        Status::InProgress,
                        Priority::High,
                    ),
                ],
            },
            Module {
                id: "ehb-wallet".to_string(),
                title: "EHB Wallet".to_string(),
                description: Some(
                    "Digital wallet holding balances, rewards and commissions.".to_string(),
                ),
                status: Status::InProgress,
                priority: Some(Priority::High),
                tags: tags(&["finance", "wallet"]),
                progress: 45,
                owner: Some("Fintech Team".to_string()),
                start_date: Some(date(2024, 3, 1)),
                end_date: Some(date(2024, 12, 15)),
                features: vec![
                    feature(
                        "payment-processing",
                        "Payment Processing",
                        "Card, bank transfer and mobile money checkout.",
                        Status::InProgress,
                        Priority::Critical,
                    ),
                    feature(
                        "transaction-history",
                        "Transaction History",
                        "Searchable ledger of every credit and debit.",
                        Status::Planned,
                        Priority::Medium,
                    ),
                ],
            },
            Module {
                id: "franchise-management".to_string(),
                title: "Franchise Management".to_string(),
                description: Some(
                    "Onboard franchisees, track territories and monitor outlet performance."
                        .to_string(),
                ),
                status: Status::Planned,
                priority: Some(Priority::High),
                tags: tags(&["franchise", "operations"]),
                progress: 10,
                owner: Some("Operations Team".to_string()),
                start_date: Some(date(2024, 6, 1)),
                end_date: None,
                features: vec![
                    feature(
                        "territory-mapping",
                        "Territory Mapping",
                        "Assign exclusive regions to franchisees.",
                        Status::Planned,
                        Priority::Medium,
                    ),
                    feature(
                        "franchise-dashboard",
                        "Franchise Dashboard",
                        "Sales, staffing and compliance metrics per outlet.",
                        Status::Planned,
                        Priority::High,
                    ),
                ],
            },
            Module {
                id: "affiliate-network".to_string(),
                title: "Affiliate Network".to_string(),
                description: Some(
                    "Multi-level referral tracking with commission payouts.".to_string(),
                ),
                status: Status::Planned,
                priority: Some(Priority::Medium),
                tags: tags(&["affiliate", "mlm", "growth"]),
                progress: 0,
                owner: Some("Growth Team".to_string()),
                start_date: None,
                end_date: None,
                features: vec![feature(
                    "referral-tree",
                    "Referral Tree",
                    "Visualize downline levels and earnings.",
                    Status::Planned,
                    Priority::Medium,
                )],
            },
            Module {
                id: "e-learning-library".to_string(),
                title: "E-Learning Library".to_string(),
                description: Some("Courses and certifications for partners and staff.".to_string()),
                status: Status::Completed,
                priority: Some(Priority::Medium),
                tags: tags(&["education", "content"]),
                progress: 100,
                owner: Some("Academy Team".to_string()),
                start_date: Some(date(2023, 9, 1)),
                end_date: Some(date(2024, 2, 28)),
                features: vec![feature(
                    "course-catalog",
                    "Course Catalog",
                    "Browse and enroll in training programs.",
                    Status::Completed,
                    Priority::Medium,
                )],
            },
            Module {
                id: "content-moderation".to_string(),
                title: "Content Moderation".to_string(),
                description: Some(
                    "Review queue for user submitted listings, reviews and media.".to_string(),
                ),
                status: Status::OnHold,
                priority: Some(Priority::Low),
                tags: tags(&["trust", "content"]),
                progress: 20,
                owner: None,
                start_date: None,
                end_date: None,
                features: vec![],
            },
            Module {
                id: "sql-verification".to_string(),
                title: "SQL Verification Levels".to_string(),
                description: Some(
                    "Service Quality Level tiers that gate access to premium features.".to_string(),
                ),
                status: Status::InProgress,
                priority: Some(Priority::High),
                tags: tags(&["trust", "verification"]),
                progress: 55,
                owner: Some("Trust Team".to_string()),
                start_date: Some(date(2024, 2, 1)),
                end_date: Some(date(2024, 10, 31)),
                features: vec![feature(
                    "document-review",
                    "Document Review",
                    "Upload and approve identity and business documents.",
                    Status::InProgress,
                    Priority::High,
                )],
            },
        ],
        timeline: vec![
            TimelineEvent {
                id: "phase-1".to_string(),
                title: "Phase 1: Foundation".to_string(),
                description: Some("Launch identity, wallet beta and the learning library.".to_string()),
                date: date(2024, 3, 31),
                status: Status::Completed,
                priority: Some(Priority::Critical),
                tags: tags(&["launch"]),
                module_ids: vec!["core-platform".to_string(), "e-learning-library".to_string()],
            },
            TimelineEvent {
                id: "phase-2".to_string(),
                title: "Phase 2: Expansion".to_string(),
                description: Some("Open franchising and verification levels in new regions.".to_string()),
                date: date(2024, 9, 30),
                status: Status::InProgress,
                priority: Some(Priority::High),
                tags: tags(&["growth"]),
                module_ids: vec![
                    "franchise-management".to_string(),
                    "sql-verification".to_string(),
                ],
            },
            TimelineEvent {
                id: "phase-3".to_string(),
                title: "Phase 3: Scale".to_string(),
                description: Some("Affiliate network and marketplace moderation at scale.".to_string()),
                date: date(2025, 3, 31),
                status: Status::Planned,
                priority: Some(Priority::Medium),
                tags: tags(&["growth", "scale"]),
                module_ids: vec![
                    "affiliate-network".to_string(),
                    "content-moderation".to_string(),
                ],
            },
        ],
    }
}
