//! Per-run counters and the end-of-run summary.

use crate::store::DeliveryReport;

/// Stats from one watch run.
#[derive(Debug, Default)]
pub struct RunStats {
    pub keywords_searched: u32,
    pub keywords_failed: u32,
    pub results_fetched: u32,
    pub per_keyword: Vec<(String, usize)>,
    pub urls_new: u32,
    pub delivery: DeliveryReport,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Watch Run Complete ===")?;
        writeln!(f, "Keywords searched:  {}", self.keywords_searched)?;
        writeln!(f, "Keywords failed:    {}", self.keywords_failed)?;
        writeln!(f, "Results fetched:    {}", self.results_fetched)?;
        writeln!(f, "New URLs:           {}", self.urls_new)?;
        if !self.per_keyword.is_empty() {
            writeln!(f, "\nBy keyword:")?;
            for (keyword, count) in &self.per_keyword {
                writeln!(f, "  {keyword}: {count}")?;
            }
        }
        writeln!(f, "\n{}", self.delivery)
    }
}
