//! Incident volume and SLA breach aggregates
//!
//! Computes the series behind the incident dashboard: monthly creation and
//! resolution volume, per-priority monthly trends, application and
//! priority distributions, and breach counts/rates per priority.

use crate::deriver::DerivedTable;
use crate::incident::YearMonth;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write;

/// Incident count for one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: YearMonth,
    pub count: usize,
}

/// Incident count for one label (priority, application)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Monthly creation counts for one priority, zero-filled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityTrend {
    pub priority: String,
    pub monthly: Vec<MonthCount>,
}

/// Breached share of a priority's incidents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreachRate {
    pub priority: String,
    pub total: usize,
    pub breached: usize,
    pub percentage: f64,
}

/// Breached vs. within-SLA split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreachSplit {
    pub breached: usize,
    pub within_sla: usize,
}

/// All dashboard aggregates for a derived table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub total_incidents: usize,
    pub created_per_month: Vec<MonthCount>,
    pub resolved_per_month: Vec<MonthCount>,
    pub priority_trends: Vec<PriorityTrend>,
    pub applications: Vec<LabelCount>,
    pub priorities: Vec<LabelCount>,
    pub breach_split: BreachSplit,
    pub breaches_by_priority: Vec<LabelCount>,
    pub breach_rates: Vec<BreachRate>,
}

fn month_counts<I: IntoIterator<Item = YearMonth>>(months: I) -> Vec<MonthCount> {
    let mut counts: BTreeMap<YearMonth, usize> = BTreeMap::new();
    for month in months {
        *counts.entry(month).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(month, count)| MonthCount { month, count })
        .collect()
}

/// Counts sorted by descending count, ties by label
///
/// Empty cells are missing values and are not counted as a label.
fn label_counts<'a, I: IntoIterator<Item = &'a str>>(labels: I) -> Vec<LabelCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels.into_iter().filter(|label| !label.is_empty()) {
        *counts.entry(label).or_default() += 1;
    }
    let mut sorted: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    sorted
}

/// Priorities in order of first appearance
fn priorities_in_order(table: &DerivedTable) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    table
        .iter()
        .map(|row| row.record.priority.as_str())
        .filter(|p| !p.is_empty() && seen.insert(*p))
        .collect()
}

fn priority_trends(table: &DerivedTable) -> Vec<PriorityTrend> {
    let months: BTreeSet<YearMonth> = table.iter().map(|row| row.creation_month).collect();
    let mut pivot: HashMap<(&str, YearMonth), usize> = HashMap::new();
    for row in table {
        *pivot
            .entry((row.record.priority.as_str(), row.creation_month))
            .or_default() += 1;
    }

    priorities_in_order(table)
        .into_iter()
        .map(|priority| PriorityTrend {
            priority: priority.to_string(),
            monthly: months
                .iter()
                .map(|&month| MonthCount {
                    month,
                    count: pivot.get(&(priority, month)).copied().unwrap_or(0),
                })
                .collect(),
        })
        .collect()
}

fn breach_rates(table: &DerivedTable) -> Vec<BreachRate> {
    let mut per_priority: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for row in table.iter().filter(|row| !row.record.priority.is_empty()) {
        let entry = per_priority.entry(row.record.priority.as_str()).or_default();
        entry.0 += 1;
        if row.sla_breached {
            entry.1 += 1;
        }
    }

    per_priority
        .into_iter()
        .map(|(priority, (total, breached))| BreachRate {
            priority: priority.to_string(),
            total,
            breached,
            percentage: breached as f64 / total as f64 * 100.0,
        })
        .collect()
}

/// Compute every aggregate over the derived table
pub fn summarize(table: &DerivedTable) -> SummaryReport {
    let breached = table.iter().filter(|row| row.sla_breached).count();

    let mut breaches_by_priority = label_counts(
        table
            .iter()
            .filter(|row| row.sla_breached)
            .map(|row| row.record.priority.as_str()),
    );
    breaches_by_priority.sort_by(|a, b| a.label.cmp(&b.label));

    SummaryReport {
        total_incidents: table.len(),
        created_per_month: month_counts(table.iter().map(|row| row.creation_month)),
        resolved_per_month: month_counts(table.iter().filter_map(|row| row.resolution_month)),
        priority_trends: priority_trends(table),
        applications: label_counts(table.iter().map(|row| row.record.application.as_str())),
        priorities: label_counts(table.iter().map(|row| row.record.priority.as_str())),
        breach_split: BreachSplit {
            breached,
            within_sla: table.len() - breached,
        },
        breaches_by_priority,
        breach_rates: breach_rates(table),
    }
}

impl SummaryReport {
    /// Human-readable report
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== SLA Summary ({} incidents) ===", self.total_incidents);

        let _ = writeln!(out, "\nIncidents created per month:");
        for entry in &self.created_per_month {
            let _ = writeln!(out, "  {}  {:>6}", entry.month, entry.count);
        }

        let _ = writeln!(out, "\nIncidents resolved per month:");
        for entry in &self.resolved_per_month {
            let _ = writeln!(out, "  {}  {:>6}", entry.month, entry.count);
        }

        let _ = writeln!(out, "\nIncidents by priority per month:");
        for trend in &self.priority_trends {
            let series: Vec<String> = trend
                .monthly
                .iter()
                .map(|m| format!("{}={}", m.month, m.count))
                .collect();
            let _ = writeln!(out, "  {}: {}", trend.priority, series.join(" "));
        }

        let _ = writeln!(out, "\nIncidents by application:");
        for entry in &self.applications {
            let _ = writeln!(out, "  {:<24} {:>6}", entry.label, entry.count);
        }

        let _ = writeln!(out, "\nIncidents by priority:");
        for entry in &self.priorities {
            let share = entry.count as f64 / self.total_incidents.max(1) as f64 * 100.0;
            let _ = writeln!(out, "  {:<12} {:>6}  ({:.1}%)", entry.label, entry.count, share);
        }

        let _ = writeln!(
            out,
            "\nSLA breached: {} / within SLA: {}",
            self.breach_split.breached, self.breach_split.within_sla
        );

        let _ = writeln!(out, "\nSLA breaches by priority:");
        for rate in &self.breach_rates {
            let _ = writeln!(
                out,
                "  {:<12} {:>6} of {:>6}  ({:.1}%)",
                rate.priority, rate.breached, rate.total, rate.percentage
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deriver::DerivedIncident;
    use crate::incident::{ColumnLayout, IncidentRecord};
    use chrono::NaiveDate;

    fn row(
        priority: &str,
        app: &str,
        created: (i32, u32),
        resolved_after: Option<i64>,
    ) -> DerivedIncident {
        let created = NaiveDate::from_ymd_opt(created.0, created.1, 20)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let resolved = resolved_after.map(|d| created + chrono::Duration::days(d));
        let record = IncidentRecord::new("INC", priority, created, resolved, app);
        DerivedIncident::from_record(record, Some("2:0:0:0".parse().unwrap()))
    }

    fn sample_table() -> DerivedTable {
        DerivedTable::new(
            ColumnLayout::default(),
            vec![
                row("P2", "crm", (2024, 1), Some(1)),
                row("P1", "billing", (2024, 1), Some(15)),
                row("P1", "billing", (2024, 2), Some(5)),
                row("P3", "crm", (2024, 2), None),
                row("P1", "portal", (2024, 3), Some(0)),
            ],
        )
    }

    #[test]
    fn test_month_volumes() {
        let report = summarize(&sample_table());
        assert_eq!(report.total_incidents, 5);

        let created: Vec<(String, usize)> = report
            .created_per_month
            .iter()
            .map(|m| (m.month.to_string(), m.count))
            .collect();
        assert_eq!(
            created,
            vec![
                ("2024-01".to_string(), 2),
                ("2024-02".to_string(), 2),
                ("2024-03".to_string(), 1)
            ]
        );

        // Jan 20 + 15 days lands in February; the unresolved row is skipped
        let resolved: Vec<(String, usize)> = report
            .resolved_per_month
            .iter()
            .map(|m| (m.month.to_string(), m.count))
            .collect();
        assert_eq!(
            resolved,
            vec![
                ("2024-01".to_string(), 1),
                ("2024-02".to_string(), 2),
                ("2024-03".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_priority_trends_zero_filled_in_appearance_order() {
        let report = summarize(&sample_table());
        let order: Vec<&str> = report.priority_trends.iter().map(|t| t.priority.as_str()).collect();
        assert_eq!(order, vec!["P2", "P1", "P3"]);

        let p3: Vec<usize> = report.priority_trends[2].monthly.iter().map(|m| m.count).collect();
        assert_eq!(p3, vec![0, 1, 0]);
        let p1: Vec<usize> = report.priority_trends[1].monthly.iter().map(|m| m.count).collect();
        assert_eq!(p1, vec![1, 1, 1]);
    }

    #[test]
    fn test_label_distributions_sorted_by_count() {
        let report = summarize(&sample_table());
        assert_eq!(
            report.applications,
            vec![
                LabelCount {
                    label: "billing".to_string(),
                    count: 2
                },
                LabelCount {
                    label: "crm".to_string(),
                    count: 2
                },
                LabelCount {
                    label: "portal".to_string(),
                    count: 1
                },
            ]
        );
        assert_eq!(
            report.priorities[0],
            LabelCount {
                label: "P1".to_string(),
                count: 3
            }
        );
    }

    #[test]
    fn test_breach_counts_and_rates() {
        let report = summarize(&sample_table());
        // P1: 15-2=13 breached, 5-2=3 breached, 0-2 not; P2: 1-2 not; P3 unresolved
        assert_eq!(
            report.breach_split,
            BreachSplit {
                breached: 2,
                within_sla: 3
            }
        );
        assert_eq!(
            report.breaches_by_priority,
            vec![LabelCount {
                label: "P1".to_string(),
                count: 2
            }]
        );

        let p1 = report.breach_rates.iter().find(|r| r.priority == "P1").unwrap();
        assert_eq!((p1.total, p1.breached), (3, 2));
        assert!((p1.percentage - 66.666).abs() < 0.01);
        let p2 = report.breach_rates.iter().find(|r| r.priority == "P2").unwrap();
        assert_eq!(p2.percentage, 0.0);
    }

    #[test]
    fn test_empty_labels_not_counted() {
        let table = DerivedTable::new(
            ColumnLayout::default(),
            vec![
                row("P1", "", (2024, 1), Some(1)),
                row("", "crm", (2024, 1), Some(9)),
                row("P1", "crm", (2024, 2), None),
            ],
        );
        let report = summarize(&table);

        let apps: Vec<&str> = report.applications.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(apps, vec!["crm"]);
        let priorities: Vec<&str> = report.priorities.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(priorities, vec!["P1"]);
        assert_eq!(report.priority_trends.len(), 1);
        assert!(report.breach_rates.iter().all(|r| !r.priority.is_empty()));
        assert_eq!(report.total_incidents, 3);
    }

    #[test]
    fn test_empty_table() {
        let report = summarize(&DerivedTable::default());
        assert_eq!(report.total_incidents, 0);
        assert!(report.created_per_month.is_empty());
        assert!(report.breach_rates.is_empty());
        assert!(report.render_text().contains("0 incidents"));
    }

    #[test]
    fn test_render_text_sections() {
        let text = summarize(&sample_table()).render_text();
        assert!(text.contains("Incidents created per month:"));
        assert!(text.contains("2024-01"));
        assert!(text.contains("SLA breached: 2 / within SLA: 3"));
        assert!(text.contains("(66.7%)"));
    }
}
