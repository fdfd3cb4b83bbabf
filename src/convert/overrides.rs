//! User-supplied overrides for remote and branch

use std::collections::HashMap;

/// Form field prefix for a per-repository branch override
pub const BRANCH_PREFIX: &str = "branch_";

/// Form field prefix for a per-repository remote override
pub const REMOTE_PREFIX: &str = "remote_";

/// Form field holding the branch applied to every repository
pub const BRANCH_FOR_ALL_FIELD: &str = "branchForAll";

/// Form field holding the remote applied to every repository
pub const REMOTE_FOR_ALL_FIELD: &str = "remoteForAll";

/// Overrides collected from one request
///
/// Values are trimmed on the way in and global values that trim to nothing
/// are dropped, so a present global always wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Branch overrides keyed by repository name
    pub branches: HashMap<String, String>,

    /// Remote overrides keyed by repository name
    pub remotes: HashMap<String, String>,

    /// Branch for every repository
    pub branch_for_all: Option<String>,

    /// Remote for every repository
    pub remote_for_all: Option<String>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect overrides from submitted form fields in a single pass
    ///
    /// `branch_<name>` and `remote_<name>` fields become per-repository
    /// overrides for `<name>`; `branchForAll` and `remoteForAll` set the
    /// globals. Anything else is ignored. When a key repeats, the last one
    /// wins.
    pub fn from_form_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut overrides = Self::new();

        for (key, value) in fields {
            let key = key.as_ref();
            let value = value.as_ref();

            if let Some(name) = key.strip_prefix(BRANCH_PREFIX) {
                overrides.set_branch(name, value);
            } else if let Some(name) = key.strip_prefix(REMOTE_PREFIX) {
                overrides.set_remote(name, value);
            } else if key == BRANCH_FOR_ALL_FIELD {
                overrides.branch_for_all = non_blank(value);
            } else if key == REMOTE_FOR_ALL_FIELD {
                overrides.remote_for_all = non_blank(value);
            }
        }

        tracing::trace!(
            branches = overrides.branches.len(),
            remotes = overrides.remotes.len(),
            branch_for_all = overrides.branch_for_all.is_some(),
            remote_for_all = overrides.remote_for_all.is_some(),
            "Collected overrides"
        );

        overrides
    }

    /// Set the branch override for one repository
    pub fn set_branch(&mut self, repository: impl Into<String>, branch: &str) {
        self.branches
            .insert(repository.into(), branch.trim().to_string());
    }

    /// Set the remote override for one repository
    pub fn set_remote(&mut self, repository: impl Into<String>, remote: &str) {
        self.remotes
            .insert(repository.into(), remote.trim().to_string());
    }

    pub fn with_branch(mut self, repository: impl Into<String>, branch: &str) -> Self {
        self.set_branch(repository, branch);
        self
    }

    pub fn with_remote(mut self, repository: impl Into<String>, remote: &str) -> Self {
        self.set_remote(repository, remote);
        self
    }

    pub fn with_branch_for_all(mut self, branch: &str) -> Self {
        self.branch_for_all = non_blank(branch);
        self
    }

    pub fn with_remote_for_all(mut self, remote: &str) -> Self {
        self.remote_for_all = non_blank(remote);
        self
    }

    /// Branch for `repository`, falling back to `parsed`
    pub fn branch_for<'a>(&'a self, repository: &str, parsed: &'a str) -> &'a str {
        resolve(
            self.branch_for_all.as_deref(),
            self.branches.get(repository),
            parsed,
        )
    }

    /// Remote for `repository`, falling back to `parsed`
    pub fn remote_for<'a>(&'a self, repository: &str, parsed: &'a str) -> &'a str {
        resolve(
            self.remote_for_all.as_deref(),
            self.remotes.get(repository),
            parsed,
        )
    }
}

/// A blank per-repository override counts as "not overridden". Parsed values
/// are trimmed the same way overrides are.
fn resolve<'a>(for_all: Option<&'a str>, explicit: Option<&'a String>, parsed: &'a str) -> &'a str {
    if let Some(value) = for_all {
        return value;
    }
    match explicit {
        Some(value) if !value.is_empty() => value.as_str(),
        _ => parsed.trim(),
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_form_fields_classifies_prefixes() {
        let fields = vec![
            ("xml_content", "<manifest/>"),
            ("device_codename", "oriole"),
            ("branch_core", "  stable "),
            ("remote_core", "github"),
            ("remote_tools", ""),
            ("convert", "Convert"),
        ];

        let overrides = Overrides::from_form_fields(fields);

        assert_eq!(overrides.branches.len(), 1);
        assert_eq!(overrides.branches["core"], "stable");
        assert_eq!(overrides.remotes.len(), 2);
        assert_eq!(overrides.remotes["core"], "github");
        assert_eq!(overrides.remotes["tools"], "");
        assert_eq!(overrides.branch_for_all, None);
        assert_eq!(overrides.remote_for_all, None);
    }

    #[test]
    fn test_names_keep_everything_after_prefix() {
        let overrides = Overrides::from_form_fields([
            ("branch_platform/build_tools", "main"),
            ("remote_branch_x", "aosp"),
        ]);

        assert_eq!(overrides.branches["platform/build_tools"], "main");
        assert_eq!(overrides.remotes["branch_x"], "aosp");
        assert!(!overrides.branches.contains_key("x"));
    }

    #[test]
    fn test_global_fields() {
        let overrides = Overrides::from_form_fields([
            ("branchForAll", " release "),
            ("remoteForAll", "   "),
        ]);

        assert_eq!(overrides.branch_for_all.as_deref(), Some("release"));
        assert_eq!(overrides.remote_for_all, None);
        // "branchForAll" must not be mistaken for a per-repository field
        assert!(overrides.branches.is_empty());
    }

    #[test]
    fn test_last_duplicate_wins() {
        let overrides =
            Overrides::from_form_fields([("branch_core", "one"), ("branch_core", "two")]);
        assert_eq!(overrides.branches["core"], "two");
    }

    #[test]
    fn test_precedence() {
        let overrides = Overrides::new().with_branch("core", "stable");
        assert_eq!(overrides.branch_for("core", "main"), "stable");
        assert_eq!(overrides.branch_for("other", "main"), "main");
        assert_eq!(overrides.remote_for("core", "aosp"), "aosp");

        let overrides = overrides.with_branch_for_all("release");
        assert_eq!(overrides.branch_for("core", "main"), "release");
        assert_eq!(overrides.branch_for("other", ""), "release");
    }

    #[test]
    fn test_blank_override_falls_back_to_parsed() {
        let overrides = Overrides::new().with_remote("core", "  ");
        assert_eq!(overrides.remote_for("core", "aosp"), "aosp");
        assert_eq!(overrides.remote_for("core", ""), "");
    }

    #[test]
    fn test_parsed_values_trimmed() {
        let overrides = Overrides::new();
        assert_eq!(overrides.remote_for("core", " aosp "), "aosp");
        assert_eq!(overrides.branch_for("core", "\tmain\n"), "main");
    }

    #[test]
    fn test_builder_trims() {
        let overrides = Overrides::new()
            .with_remote("core", " github ")
            .with_remote_for_all("")
            .with_branch_for_all(" main");

        assert_eq!(overrides.remotes["core"], "github");
        assert_eq!(overrides.remote_for_all, None);
        assert_eq!(overrides.branch_for_all.as_deref(), Some("main"));
    }
}
