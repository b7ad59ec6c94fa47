//! Cross-framework deduplication
//!
//! The same package or project may be declared under several target
//! frameworks. Identity-level views keep one entry per package id and one
//! entry per project path; framework-specific views are left untouched.

use crate::domain::{FrameworkOrdering, PackageReference, ProjectReference};
use std::collections::HashMap;

/// Keep one package reference per id (case-insensitive). Within a group the
/// candidate whose framework sorts first under `ordering` wins; the sort is
/// stable, so equal frameworks keep declaration order. Groups are emitted in
/// first-appearance order.
pub fn dedupe_package_references(
    references: Vec<PackageReference>,
    ordering: &dyn FrameworkOrdering,
) -> Vec<PackageReference> {
    let mut groups: Vec<Vec<PackageReference>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for reference in references {
        let key = reference.identity.key();
        match index.get(&key) {
            Some(&i) => groups[i].push(reference),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![reference]);
            }
        }
    }

    groups
        .into_iter()
        .filter_map(|mut group| {
            group.sort_by(|a, b| ordering.compare(&a.target_framework, &b.target_framework));
            group.into_iter().next()
        })
        .collect()
}

/// Keep the first project reference seen per project path (case-insensitive).
/// References without a path are grouped by unique name instead.
// Assumes a path referenced under different frameworks has equivalent
// restore semantics; casing-only differences collapse as well.
pub fn dedupe_project_references(references: Vec<ProjectReference>) -> Vec<ProjectReference> {
    let mut seen = std::collections::HashSet::new();
    references
        .into_iter()
        .filter(|reference| {
            let key = match &reference.project_path {
                Some(path) => format!("path:{}", path.to_lowercase()),
                None => format!("name:{}", reference.project_unique_name.to_lowercase()),
            };
            seen.insert(key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeclaredOrder, Framework, FrameworkSorter, PackageIdentity, PackageVersion};

    fn fw(moniker: &str) -> Framework {
        Framework::parse(moniker).unwrap()
    }

    fn package(id: &str, version: PackageVersion, framework: &str) -> PackageReference {
        PackageReference::new(PackageIdentity::new(id, Some(version)), fw(framework))
    }

    #[test]
    fn test_lowest_priority_framework_wins() {
        let refs = vec![
            package("a", PackageVersion::new(2, 0, 0), "net472"),
            package("a", PackageVersion::new(1, 0, 0), "net45"),
        ];
        let order = DeclaredOrder::new(vec![fw("net45"), fw("net472")]);
        let deduped = dedupe_package_references(refs, &order);

        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].identity.version, Some(PackageVersion::new(1, 0, 0)));
        assert_eq!(deduped[0].target_framework, fw("net45"));
    }

    #[test]
    fn test_canonical_sorter_matches_declared_for_net45() {
        let refs = vec![
            package("a", PackageVersion::new(1, 0, 0), "net45"),
            package("a", PackageVersion::new(2, 0, 0), "net472"),
        ];
        let deduped = dedupe_package_references(refs, &FrameworkSorter);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].identity.version, Some(PackageVersion::new(1, 0, 0)));
    }

    #[test]
    fn test_package_ids_group_case_insensitively() {
        let refs = vec![
            package("Newtonsoft.Json", PackageVersion::new(9, 0, 1), "net45"),
            package("newtonsoft.json", PackageVersion::new(10, 0, 1), "net472"),
            package("b", PackageVersion::new(1, 0, 0), "net45"),
        ];
        let deduped = dedupe_package_references(refs, &FrameworkSorter);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].identity.id, "Newtonsoft.Json");
        assert_eq!(deduped[1].identity.id, "b");
    }

    #[test]
    fn test_project_paths_collapse_case_insensitively() {
        let refs = vec![
            ProjectReference::new("a", Some("C:\\Foo\\a.csproj".to_string())),
            ProjectReference::new("a", Some("c:\\foo\\A.CSPROJ".to_string())),
        ];
        let deduped = dedupe_project_references(refs);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].project_path.as_deref(), Some("C:\\Foo\\a.csproj"));
    }

    #[test]
    fn test_project_references_without_path_group_by_name() {
        let refs = vec![
            ProjectReference::new("a", None),
            ProjectReference::new("A", None),
            ProjectReference::new("b", None),
        ];
        let deduped = dedupe_project_references(refs);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(dedupe_package_references(Vec::new(), &FrameworkSorter).is_empty());
        assert!(dedupe_project_references(Vec::new()).is_empty());
    }
}
