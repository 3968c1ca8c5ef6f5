/// Outcome of one synthesis pass, per segment index.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub synthesized: Vec<usize>,
    pub failed: Vec<(usize, String)>,
    pub skipped_empty: Vec<usize>,
    /// Synthesized, but the silence could not be appended.
    pub unpadded: Vec<usize>,
}

impl RunReport {
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut summary = format!("{} synthesized, {} failed", self.synthesized.len(), self.failed.len());
        if !self.skipped_empty.is_empty() {
            summary.push_str(&format!(", {} empty", self.skipped_empty.len()));
        }
        if !self.unpadded.is_empty() {
            summary.push_str(&format!(", {} without silence", self.unpadded.len()));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_mentions_only_nonzero_extras() {
        let report = RunReport {
            synthesized: vec![1, 3],
            failed: vec![(2, "status 400".to_string())],
            ..RunReport::default()
        };
        assert_eq!(report.summary(), "2 synthesized, 1 failed");
        assert!(!report.is_complete());

        let report = RunReport { unpadded: vec![4], skipped_empty: vec![5], ..report };
        assert_eq!(report.summary(), "2 synthesized, 1 failed, 1 empty, 1 without silence");
    }
}
