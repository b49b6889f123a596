//! Cross-reference of call sites against the version database.

use std::collections::BTreeMap;

use crate::build::{VersionDatabase, VersionEntry};
use crate::version::max_version;

use super::{CallSite, UsageLines, UsageRecord};

/// Join one file's call sites with the database's function table.
///
/// Calls to names the database does not know are dropped. Every matched
/// call keeps its line, duplicates included, in source order.
pub fn match_call_sites(
    sites: &[CallSite],
    database: &VersionDatabase,
) -> BTreeMap<String, UsageRecord> {
    let mut found: BTreeMap<&str, (&VersionEntry, Vec<usize>)> = BTreeMap::new();

    for site in sites {
        let Some(entry) = database.lookup_function(&site.name) else {
            continue;
        };
        found
            .entry(site.name.as_str())
            .or_insert_with(|| (entry, Vec::new()))
            .1
            .push(site.line);
    }

    found
        .into_iter()
        .map(|(name, (entry, lines))| {
            (
                name.to_string(),
                UsageRecord::new(name, entry, UsageLines::Single(lines)),
            )
        })
        .collect()
}

/// The greatest non-empty `since` among `usages`, or an empty string.
pub fn highest_version<'a, I>(usages: I) -> String
where
    I: IntoIterator<Item = &'a UsageRecord>,
{
    max_version(usages.into_iter().map(|u| u.since.as_str()))
}
