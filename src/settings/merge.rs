use std::collections::HashSet;

use super::model::{Mirrors, Proxies, Servers, Settings};

/// Merges user settings (dominant) over global settings (recessive).
///
/// Scalars keep the dominant value when it is set. Collections merge by
/// id: a recessive entry whose id also appears in the dominant list is
/// dropped, and the surviving recessive entries go ahead of the dominant
/// ones.
pub(super) fn merge(dominant: Settings, recessive: Settings) -> Settings {
    Settings {
        local_repository: dominant.local_repository.or(recessive.local_repository),
        interactive_mode: dominant.interactive_mode.or(recessive.interactive_mode),
        offline: dominant.offline.or(recessive.offline),
        servers: Servers {
            entries: merge_by_id(dominant.servers.entries, recessive.servers.entries, |s| {
                &s.id
            }),
        },
        mirrors: Mirrors {
            entries: merge_by_id(dominant.mirrors.entries, recessive.mirrors.entries, |m| {
                &m.id
            }),
        },
        proxies: Proxies {
            entries: merge_by_id(dominant.proxies.entries, recessive.proxies.entries, |p| {
                &p.id
            }),
        },
    }
}

fn merge_by_id<T, F>(dominant: Vec<T>, recessive: Vec<T>, id_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let dominant_ids: HashSet<&str> = dominant.iter().map(|e| id_of(e)).collect();

    let mut merged: Vec<T> = recessive
        .into_iter()
        .filter(|e| !dominant_ids.contains(id_of(e)))
        .collect();
    merged.extend(dominant);
    merged
}
