use std::collections::HashMap;

use crate::models::{Academy, Medal, MedalType, RankingEntry};

/// Builds one entry per academy, ordered by total medals descending.
///
/// The sort is stable: academies with equal totals keep the order they were
/// given in. Medals whose type is not one of the known markers are left out of
/// every count.
pub fn rank(academies: &[Academy], medals_by_academy: &HashMap<i64, Vec<Medal>>) -> Vec<RankingEntry> {
    let mut entries: Vec<RankingEntry> = academies
        .iter()
        .map(|academy| {
            let medals = medals_by_academy
                .get(&academy.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            tally(academy, medals)
        })
        .collect();

    entries.sort_by(|a, b| b.total.cmp(&a.total));
    entries
}

fn tally(academy: &Academy, medals: &[Medal]) -> RankingEntry {
    let (mut gold, mut silver, mut bronze) = (0, 0, 0);

    for medal in medals {
        match medal.kind() {
            Some(MedalType::Gold) => gold += 1,
            Some(MedalType::Silver) => silver += 1,
            Some(MedalType::Bronze) => bronze += 1,
            None => {}
        }
    }

    RankingEntry {
        academy_id: academy.id,
        academy_name: academy.name.clone(),
        gold,
        silver,
        bronze,
        total: gold + silver + bronze,
    }
}
