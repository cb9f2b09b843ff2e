//! Keyword rule lists, kept as data so new services can extend them
//! without touching classifier logic.

/// Ordered keyword lists driving the text heuristics. Keywords are matched
/// against lower-cased text, so entries must be lower-case themselves.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub success_keywords: Vec<String>,
    pub failure_keywords: Vec<String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            // "already signed in" counts as success: the day's goal is met.
            success_keywords: to_owned(&["成功", "success", "ok", "已签到"]),
            failure_keywords: to_owned(&["失败", "fail", "error", "错误"]),
        }
    }
}

impl RuleSet {
    /// Extend the stock lists with service-specific keywords.
    pub fn with_extra(
        mut self,
        success: &[&str],
        failure: &[&str],
    ) -> Self {
        self.success_keywords.extend(to_owned(success));
        self.failure_keywords.extend(to_owned(failure));
        self
    }
}

fn to_owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_keywords_are_appended() {
        let rules = RuleSet::default().with_extra(&["领取"], &["封禁"]);
        assert!(rules.success_keywords.iter().any(|k| k == "领取"));
        assert!(rules.failure_keywords.iter().any(|k| k == "封禁"));
        // stock lists survive
        assert!(rules.success_keywords.iter().any(|k| k == "success"));
    }
}
