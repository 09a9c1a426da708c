use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Floor for the date reduction, so an empty history folds cleanly instead
/// of failing.
const DATE_FLOOR: &str = "1900-01-01";

/// One recorded set. `workout_date` is empty except in per-exercise history
/// rows, where it names the workout the set belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Set {
    pub id: i64,
    pub exercise: i64,
    pub exercise_name: String,
    pub weight: String,
    pub reps: i64,
    #[serde(default)]
    pub workout_date: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Sets sharing one exercise identity within a single workout. Derived on
/// demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseGroup {
    pub exercise: i64,
    pub exercise_name: String,
    pub sets: Vec<Set>,
}

/// Partition a flat sequence of sets into exercise groups.
///
/// Identity is the (exercise id, exercise name) pair. Sets within a group
/// are ordered ascending by id; the groups themselves keep the order in
/// which their identity first appears in the input.
pub fn group_by_exercise(sets: &[Set]) -> Vec<ExerciseGroup> {
    let mut groups: Vec<ExerciseGroup> = Vec::new();

    for set in sets {
        let found = groups
            .iter_mut()
            .find(|group| group.exercise == set.exercise && group.exercise_name == set.exercise_name);
        match found {
            Some(group) => group.sets.push(set.clone()),
            None => groups.push(ExerciseGroup {
                exercise: set.exercise,
                exercise_name: set.exercise_name.clone(),
                sets: vec![set.clone()],
            }),
        }
    }

    for group in &mut groups {
        group.sets.sort_by_key(|set| set.id);
    }

    groups
}

/// All sets recorded on the most recent workout date in the sequence.
///
/// Dates are ISO `YYYY-MM-DD`, so a lexicographic maximum is a calendar
/// maximum. Empty input yields an empty subset.
pub fn most_recent_by_date(sets: &[Set]) -> Vec<Set> {
    let latest = sets.iter().fold(DATE_FLOOR.to_string(), |memo, set| {
        if set.workout_date > memo {
            set.workout_date.clone()
        } else {
            memo
        }
    });

    sets.iter()
        .filter(|set| set.workout_date == latest)
        .cloned()
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn set(id: i64, exercise: i64, name: &str, weight: &str, reps: i64) -> Set {
        Set {
            id,
            exercise,
            exercise_name: name.to_string(),
            weight: weight.to_string(),
            reps,
            workout_date: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    fn dated_set(id: i64, date: &str) -> Set {
        Set {
            workout_date: date.to_string(),
            ..set(id, 1, "Bench Press", "85Kg", 6)
        }
    }

    #[test]
    fn test_groups_by_identity_in_first_appearance_order() {
        let sets = vec![
            set(4, 1, "Bench Press", "85Kg", 6),
            set(6, 3, "Flies", "18Kg", 8),
            set(3, 1, "Bench Press", "80Kg", 6),
        ];

        let groups = group_by_exercise(&sets);
        assert_eq!(groups.len(), 2);

        let bench = &groups[0];
        assert_eq!(bench.exercise_name, "Bench Press");
        assert_eq!(bench.sets.len(), 2);
        assert_eq!(bench.sets[0].id, 3);
        assert_eq!(bench.sets[1].id, 4);

        let flies = &groups[1];
        assert_eq!(flies.exercise_name, "Flies");
        assert_eq!(flies.sets.len(), 1);
        assert_eq!(flies.sets[0].id, 6);
    }

    #[test]
    fn test_group_identity_is_id_and_name() {
        // Same name under two ids stays two groups.
        let sets = vec![
            set(1, 1, "Press", "60Kg", 5),
            set(2, 2, "Press", "60Kg", 5),
        ];

        let groups = group_by_exercise(&sets);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_group_of_empty_input() {
        assert!(group_by_exercise(&[]).is_empty());
    }

    #[test]
    fn test_most_recent_by_date_picks_maximum() {
        let sets = vec![
            dated_set(1, "2016-02-18"),
            dated_set(2, "2016-02-20"),
            dated_set(3, "2016-02-20"),
            dated_set(4, "2016-01-30"),
        ];

        let latest = most_recent_by_date(&sets);
        assert_eq!(latest.len(), 2);
        assert!(latest.iter().all(|set| set.workout_date == "2016-02-20"));
    }

    #[test]
    fn test_most_recent_by_date_of_empty_input() {
        assert!(most_recent_by_date(&[]).is_empty());
    }

    #[test]
    fn test_most_recent_by_date_with_blank_dates() {
        // Dates below the floor never match it.
        let sets = vec![dated_set(1, ""), dated_set(2, "")];
        assert!(most_recent_by_date(&sets).is_empty());
    }
}
