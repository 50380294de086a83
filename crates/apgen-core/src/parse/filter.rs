//! Include/exclude filters compiled from user ref patterns.

/// A compiled ref pattern. A trailing `*` makes the pattern a prefix match;
/// patterns without a `/` match against the final ref segment in any
/// section, while full-ref patterns are scoped to their section (so an
/// include list targeting `#/components/schemas` does not reject
/// operations).
#[derive(Debug, Clone)]
struct Pattern {
    /// Section prefix for full-ref patterns (`#/components/schemas`);
    /// `None` for bare-name patterns, which apply everywhere.
    section: Option<String>,
    name: String,
    prefix: bool,
}

impl Pattern {
    fn compile(raw: &str) -> Self {
        let (body, prefix) = match raw.strip_suffix('*') {
            Some(body) => (body, true),
            None => (raw, false),
        };
        match body.rsplit_once('/') {
            Some((section, name)) => Pattern {
                section: Some(section.to_string()),
                name: name.to_string(),
                prefix,
            },
            None => Pattern {
                section: None,
                name: body.to_string(),
                prefix,
            },
        }
    }

    fn applies_to_section(&self, ref_section: &str) -> bool {
        match &self.section {
            Some(section) => section == ref_section,
            None => true,
        }
    }

    fn matches(&self, ref_section: &str, ref_name: &str) -> bool {
        if !self.applies_to_section(ref_section) {
            return false;
        }
        if self.prefix {
            ref_name.starts_with(self.name.as_str())
        } else {
            ref_name == self.name
        }
    }
}

/// Predicates over canonical refs. A ref is processed iff it matches the
/// include set and does not match the exclude set. An include set that is
/// empty, or has no pattern targeting the ref's section, accepts all refs
/// in that section.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl Filters {
    pub fn compile(include: &[String], exclude: &[String]) -> Self {
        Filters {
            include: include.iter().map(|p| Pattern::compile(p)).collect(),
            exclude: exclude.iter().map(|p| Pattern::compile(p)).collect(),
        }
    }

    pub fn accepts(&self, ref_path: &str) -> bool {
        let (section, name) = split_ref(ref_path);

        let relevant_includes: Vec<&Pattern> = self
            .include
            .iter()
            .filter(|p| p.applies_to_section(section))
            .collect();
        let included = relevant_includes.is_empty()
            || relevant_includes.iter().any(|p| p.matches(section, name));

        included && !self.exclude.iter().any(|p| p.matches(section, name))
    }
}

fn split_ref(ref_path: &str) -> (&str, &str) {
    match ref_path.rsplit_once('/') {
        Some((section, name)) => (section, name),
        None => ("", ref_path),
    }
}
