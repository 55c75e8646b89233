use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use crate::drug::{Category, Drug};

/// A selectable answer card shown during a round.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AnswerOption {
    pub category: Category,
    pub text: String,
    /// True when `text` belongs to the drug being asked about.
    pub is_correct: bool,
}

/// Builds the shuffled answer cards for `current`.
///
/// Every category with text on `current` yields one correct option. Each
/// category then gets at most one distractor, drawn uniformly from the same
/// category of the other drugs in `pool`. Texts are unique case-insensitively
/// across the whole set, so a distractor never repeats a correct answer.
///
/// The supplied random number generator drives both the distractor picks and
/// the final shuffle, making the output deterministic with a seeded RNG.
pub fn generate_options<R: Rng + ?Sized>(
    rng: &mut R,
    current: &Drug,
    pool: &[Drug],
) -> Vec<AnswerOption> {
    let mut used = HashSet::new();
    let mut options = Vec::new();

    for category in Category::ALL {
        if let Some(text) = current.populated(category) {
            used.insert(text.to_lowercase());
            options.push(AnswerOption {
                category,
                text: text.to_string(),
                is_correct: true,
            });
        }
    }

    for category in Category::ALL {
        let candidates: Vec<&str> = pool
            .iter()
            .filter(|drug| drug.id != current.id)
            .filter_map(|drug| drug.populated(category))
            .filter(|text| !used.contains(&text.to_lowercase()))
            .collect();

        if let Some(text) = candidates.choose(rng) {
            used.insert(text.to_lowercase());
            options.push(AnswerOption {
                category,
                text: text.to_string(),
                is_correct: false,
            });
        }
    }

    options.shuffle(rng);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn drug(id: usize, name: &str, texts: [&str; 5]) -> Drug {
        let mut drug = Drug {
            id,
            name: name.to_string(),
            moa: String::new(),
            indications: String::new(),
            adverse: String::new(),
            interactions: String::new(),
            contraindications: String::new(),
        };
        for (category, text) in Category::ALL.into_iter().zip(texts) {
            *drug.attribute_mut(category) = text.to_string();
        }
        drug
    }

    fn sample_pool() -> Vec<Drug> {
        vec![
            drug(
                0,
                "Warfarin",
                [
                    "Vitamin K antagonist",
                    "Atrial fibrillation",
                    "Bleeding",
                    "Amiodarone increases INR",
                    "Pregnancy",
                ],
            ),
            drug(
                1,
                "Clopidogrel",
                [
                    "P2Y12 inhibitor",
                    "Acute coronary syndrome",
                    "bleeding",
                    "Omeprazole",
                    "Active bleed",
                ],
            ),
            drug(
                2,
                "Atorvastatin",
                [
                    "HMG-CoA reductase inhibitor",
                    "ASCVD prevention",
                    "Myalgias",
                    "CYP3A4",
                    "Pregnancy",
                ],
            ),
            drug(3, "Dopamine", ["Dose dependent receptor agonist", "", "", "", ""]),
        ]
    }

    fn per_category(options: &[AnswerOption]) -> HashMap<Category, (usize, usize)> {
        let mut counts: HashMap<Category, (usize, usize)> = HashMap::new();
        for option in options {
            let entry = counts.entry(option.category).or_default();
            if option.is_correct {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
        counts
    }

    #[test]
    fn one_correct_and_at_most_one_distractor_per_category() {
        let pool = sample_pool();

        for seed in 0..32 {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let options = generate_options(&mut rng, &pool[0], &pool);
            let counts = per_category(&options);

            for category in Category::ALL {
                let (correct, distractors) = counts.get(&category).copied().unwrap_or_default();
                assert_eq!(correct, 1, "{category} should have one correct option");
                assert!(distractors <= 1, "{category} has {distractors} distractors");
            }
        }
    }

    #[test]
    fn correct_options_carry_current_text() {
        let pool = sample_pool();
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);

        let options = generate_options(&mut rng, &pool[1], &pool);

        for option in options.iter().filter(|option| option.is_correct) {
            assert_eq!(option.text, pool[1].attribute(option.category));
        }
    }

    #[test]
    fn texts_are_unique_ignoring_case() {
        let pool = sample_pool();

        for seed in 0..32 {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let options = generate_options(&mut rng, &pool[0], &pool);

            let mut seen = HashSet::new();
            for option in &options {
                assert!(
                    seen.insert(option.text.to_lowercase()),
                    "duplicate option text: {}",
                    option.text
                );
            }
        }
    }

    #[test]
    fn distractors_come_from_other_drugs_in_same_category() {
        let pool = sample_pool();
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);

        let options = generate_options(&mut rng, &pool[2], &pool);

        for option in options.iter().filter(|option| !option.is_correct) {
            assert!(
                pool.iter()
                    .filter(|drug| drug.id != pool[2].id)
                    .any(|drug| drug.attribute(option.category) == option.text),
                "distractor {} was not sourced from another drug",
                option.text
            );
        }
    }

    #[test]
    fn empty_fields_get_no_correct_option() {
        let pool = sample_pool();
        let mut rng = rand::rngs::StdRng::seed_from_u64(9);

        let options = generate_options(&mut rng, &pool[3], &pool);
        let correct: Vec<Category> = options
            .iter()
            .filter(|option| option.is_correct)
            .map(|option| option.category)
            .collect();

        assert_eq!(correct, vec![Category::Moa]);
    }

    #[test]
    fn missing_distractors_are_accepted() {
        let pool = vec![
            drug(0, "Alpha", ["same", "a", "", "", ""]),
            drug(1, "Beta", ["SAME", "", "", "", ""]),
        ];
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);

        let options = generate_options(&mut rng, &pool[0], &pool);

        assert_eq!(options.len(), 2);
        assert!(options.iter().all(|option| option.is_correct));
    }

    #[test]
    fn same_seed_gives_same_layout() {
        let pool = sample_pool();

        let first = generate_options(&mut rand::rngs::StdRng::seed_from_u64(42), &pool[0], &pool);
        let second = generate_options(&mut rand::rngs::StdRng::seed_from_u64(42), &pool[0], &pool);

        assert_eq!(first, second);
    }
}
