//! Safety metrics

use super::ContentCategory;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/// Blocks kept for the report
pub const RECENT_BLOCKS: usize = 10;

const QUERY_PREVIEW_CHARS: usize = 100;

/// One blocked query
#[derive(Debug, Clone, Serialize)]
pub struct BlockedQuery {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub category: ContentCategory,
    pub reason: String,
}

/// Counters over every validated query
#[derive(Debug, Clone, Default, Serialize)]
pub struct SafetyMetrics {
    pub total_queries: u64,
    pub safe_queries: u64,
    pub blocked_queries: u64,
    /// Responses truncated or replaced by output validation
    pub flagged_responses: u64,
    pub category_counts: BTreeMap<ContentCategory, u64>,
    pub recent_blocks: VecDeque<BlockedQuery>,
}

impl SafetyMetrics {
    pub(crate) fn record_safe(&mut self) {
        self.total_queries += 1;
        self.safe_queries += 1;
    }

    pub(crate) fn record_block(&mut self, query: &str, category: ContentCategory, reason: &str) {
        self.total_queries += 1;
        self.blocked_queries += 1;
        *self.category_counts.entry(category).or_default() += 1;

        let preview = if query.chars().count() > QUERY_PREVIEW_CHARS {
            format!(
                "{}...",
                query.chars().take(QUERY_PREVIEW_CHARS).collect::<String>()
            )
        } else {
            query.to_string()
        };

        self.recent_blocks.push_back(BlockedQuery {
            timestamp: Utc::now(),
            query: preview,
            category,
            reason: reason.to_string(),
        });
        while self.recent_blocks.len() > RECENT_BLOCKS {
            self.recent_blocks.pop_front();
        }
    }

    pub fn safe_percentage(&self) -> f64 {
        percentage(self.safe_queries, self.total_queries)
    }

    pub fn blocked_percentage(&self) -> f64 {
        percentage(self.blocked_queries, self.total_queries)
    }

    /// Plain-text summary of the counters and the latest blocks
    pub fn report(&self) -> String {
        let mut report = String::from("StudyMate Safety Report\n");
        report.push_str(&"=".repeat(40));
        report.push_str("\n\nOverall statistics:\n");
        report.push_str(&format!("  Total queries:   {}\n", self.total_queries));
        report.push_str(&format!(
            "  Safe queries:    {} ({:.1}%)\n",
            self.safe_queries,
            self.safe_percentage()
        ));
        report.push_str(&format!(
            "  Blocked queries: {} ({:.1}%)\n",
            self.blocked_queries,
            self.blocked_percentage()
        ));
        report.push_str(&format!(
            "  Flagged answers: {}\n",
            self.flagged_responses
        ));

        if !self.category_counts.is_empty() {
            report.push_str("\nCategory breakdown:\n");
            for (category, count) in &self.category_counts {
                report.push_str(&format!("  {}: {}\n", category.label(), count));
            }
        }

        if !self.recent_blocks.is_empty() {
            report.push_str("\nRecent blocks:\n");
            for block in self.recent_blocks.iter().rev().take(5) {
                report.push_str(&format!(
                    "  {}: {} - {}\n",
                    block.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    block.category.as_str(),
                    block.query
                ));
            }
        }

        report.trim_end().to_string()
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
