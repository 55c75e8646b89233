use rand::Rng;
use rand::seq::SliceRandom;

use crate::drug::{Category, Drug};
use crate::options::{AnswerOption, generate_options};
use crate::results::Summary;

/// Smallest pool that can supply distractors.
pub const MIN_POOL_SIZE: usize = 2;
/// One selection per category is needed before a round can be submitted.
pub const REQUIRED_SELECTIONS: usize = Category::ALL.len();
pub const POINTS_PER_CORRECT: u32 = 10;
/// Added to the attempt count for every finished round, however sparse the drug.
pub const ATTEMPTS_PER_ROUND: u32 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("requires at least {required} drugs but only {available} loaded")]
    InsufficientPool { required: usize, available: usize },
    #[error("select one option in each of the {required} categories before submitting ({selected} selected)")]
    IncompleteSelection { selected: usize, required: usize },
    #[error("option {index} does not exist, this round has {available} options")]
    UnknownOption { index: usize, available: usize },
    #[error("cannot {action} while the session is in {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },
}

/// The correct text for a category the player did not match.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MissedAttribute {
    pub category: Category,
    pub correct: String,
}

/// Review entry for one round with at least one missed category.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MissedItem {
    pub drug: String,
    pub missed: Vec<MissedAttribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SessionStats {
    pub score: u32,
    pub total_correct: u32,
    pub total_attempts: u32,
    /// Rounds where all five categories were matched.
    pub perfect_matches: u32,
    pub missed_items: Vec<MissedItem>,
}

impl SessionStats {
    fn record_missed(&mut self, drug: &Drug, missed: Vec<MissedAttribute>) {
        if !missed.is_empty() {
            self.missed_items.push(MissedItem {
                drug: drug.name.clone(),
                missed,
            });
        }
    }
}

/// How a single option card is classified once a round is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Verdict {
    /// Selected and correct.
    Correct,
    /// Selected but belongs to another drug.
    Incorrect,
    /// Correct but not selected.
    Missed,
    /// An unselected distractor.
    Unselected,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RoundOutcome {
    pub correct_count: usize,
    /// One verdict per option, in display order.
    pub verdicts: Vec<Verdict>,
    pub missed: Vec<MissedAttribute>,
}

impl RoundOutcome {
    pub fn is_perfect(&self) -> bool {
        self.correct_count == REQUIRED_SELECTIONS
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// No session running; a pool may be retained from an earlier start.
    Setup,
    /// A round is loaded and accepting selections.
    Selecting,
    /// The current round was scored and is waiting for [`Session::advance`].
    Submitted(RoundOutcome),
    Results,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Selecting => "selecting",
            Phase::Submitted(_) => "submitted",
            Phase::Results => "results",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Round {
    drug: Drug,
    options: Vec<AnswerOption>,
    /// Chosen option per category, in the order categories were first chosen.
    selections: Vec<(Category, usize)>,
}

/// A single play-through of a drug pool.
///
/// All transitions happen through methods on this value; randomness is
/// supplied by the caller so that sessions replay exactly under a seeded RNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pool: Vec<Drug>,
    order: Vec<Drug>,
    round_index: usize,
    round: Option<Round>,
    stats: SessionStats,
    phase: Phase,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            pool: Vec::new(),
            order: Vec::new(),
            round_index: 0,
            round: None,
            stats: SessionStats::default(),
            phase: Phase::Setup,
        }
    }

    /// Starts a fresh session over `pool`, discarding any previous statistics.
    ///
    /// # Errors
    /// Returns [`SessionError::InsufficientPool`] if `pool` holds fewer than
    /// [`MIN_POOL_SIZE`] drugs. The session is left untouched in that case.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        pool: Vec<Drug>,
    ) -> Result<(), SessionError> {
        if pool.len() < MIN_POOL_SIZE {
            return Err(SessionError::InsufficientPool {
                required: MIN_POOL_SIZE,
                available: pool.len(),
            });
        }

        let mut order = pool.clone();
        order.shuffle(rng);

        self.pool = pool;
        self.order = order;
        self.round_index = 0;
        self.stats = SessionStats::default();
        log::info!("session started with {} drugs", self.order.len());

        self.load_round(rng);
        Ok(())
    }

    /// Plays the retained pool again with a new shuffle.
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SessionError> {
        let pool = self.pool.clone();
        self.start(rng, pool)
    }

    /// Toggles the option at `index` for its category.
    ///
    /// Choosing the selected option again clears it; choosing another option in
    /// the same category replaces the earlier choice.
    pub fn select(&mut self, index: usize) -> Result<(), SessionError> {
        self.expect_phase("select", |phase| matches!(phase, Phase::Selecting))?;
        let round = self.current_round_mut("select")?;

        let category = round
            .options
            .get(index)
            .map(|option| option.category)
            .ok_or(SessionError::UnknownOption {
                index,
                available: round.options.len(),
            })?;

        match round.selection_slot(category) {
            Some(slot) if round.selections[slot].1 == index => {
                round.selections.remove(slot);
            }
            Some(slot) => round.selections[slot].1 = index,
            None => round.selections.push((category, index)),
        }

        Ok(())
    }

    /// Scores the current selections and returns the outcome, which also stays
    /// available through [`Phase::Submitted`].
    ///
    /// # Errors
    /// Returns [`SessionError::IncompleteSelection`] unless every category has a
    /// selection; statistics are not touched in that case.
    pub fn submit(&mut self) -> Result<RoundOutcome, SessionError> {
        self.expect_phase("submit", |phase| matches!(phase, Phase::Selecting))?;
        let round = self.current_round_mut("submit")?;

        if round.selections.len() < REQUIRED_SELECTIONS {
            return Err(SessionError::IncompleteSelection {
                selected: round.selections.len(),
                required: REQUIRED_SELECTIONS,
            });
        }

        let outcome = score_round(round);
        let drug = round.drug.clone();
        let correct = outcome.correct_count as u32;

        self.stats.total_correct += correct;
        self.stats.total_attempts += ATTEMPTS_PER_ROUND;
        self.stats.score += correct * POINTS_PER_CORRECT;
        if outcome.is_perfect() {
            self.stats.perfect_matches += 1;
        }
        self.stats.record_missed(&drug, outcome.missed.clone());

        log::debug!(
            "round {} ({}) submitted: {}/{} correct",
            self.round_index + 1,
            drug.name,
            outcome.correct_count,
            REQUIRED_SELECTIONS
        );

        self.phase = Phase::Submitted(outcome.clone());
        Ok(outcome)
    }

    /// Gives up on the current drug: every populated attribute counts as missed
    /// and the session moves on.
    pub fn skip<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SessionError> {
        self.expect_phase("skip", |phase| matches!(phase, Phase::Selecting))?;
        let drug = self.current_round_mut("skip")?.drug.clone();

        let missed = drug
            .populated_categories()
            .map(|category| MissedAttribute {
                category,
                correct: drug.attribute(category).to_string(),
            })
            .collect();

        self.stats.total_attempts += ATTEMPTS_PER_ROUND;
        self.stats.record_missed(&drug, missed);
        log::debug!("round {} ({}) skipped", self.round_index + 1, drug.name);

        self.next_round(rng);
        Ok(())
    }

    /// Moves from a submitted round to the next one, or to the results.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SessionError> {
        self.expect_phase("advance", |phase| matches!(phase, Phase::Submitted(_)))?;
        self.next_round(rng);
        Ok(())
    }

    /// Returns to setup from any phase. The loaded pool is kept for the next start.
    pub fn abandon(&mut self) {
        if self.phase != Phase::Setup {
            log::debug!("session abandoned during {}", self.phase.name());
        }

        self.order.clear();
        self.round = None;
        self.round_index = 0;
        self.phase = Phase::Setup;
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn summary(&self) -> Summary {
        Summary::from_stats(&self.stats)
    }

    /// Drugs retained from the last start, in input order.
    pub fn pool(&self) -> &[Drug] {
        &self.pool
    }

    pub fn current_drug(&self) -> Option<&Drug> {
        self.round.as_ref().map(|round| &round.drug)
    }

    pub fn options(&self) -> &[AnswerOption] {
        self.round
            .as_ref()
            .map(|round| round.options.as_slice())
            .unwrap_or_default()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.round.as_ref().is_some_and(|round| {
            round
                .options
                .get(index)
                .and_then(|option| round.selection(option.category))
                == Some(index)
        })
    }

    /// The option index currently chosen for `category`, if any.
    pub fn selection_for(&self, category: Category) -> Option<usize> {
        self.round
            .as_ref()
            .and_then(|round| round.selection(category))
    }

    pub fn selected_count(&self) -> usize {
        self.round
            .as_ref()
            .map_or(0, |round| round.selections.len())
    }

    pub fn can_submit(&self) -> bool {
        self.phase == Phase::Selecting && self.selected_count() == REQUIRED_SELECTIONS
    }

    /// One-based number of the current round.
    pub fn round_number(&self) -> usize {
        self.round_index + 1
    }

    pub fn total_rounds(&self) -> usize {
        self.order.len()
    }

    pub fn is_last_round(&self) -> bool {
        self.round_number() == self.total_rounds()
    }

    fn load_round<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let drug = self.order[self.round_index].clone();
        let options = generate_options(rng, &drug, &self.order);

        log::debug!(
            "round {} loaded for {} with {} options",
            self.round_index + 1,
            drug.name,
            options.len()
        );

        self.round = Some(Round {
            drug,
            options,
            selections: Vec::new(),
        });
        self.phase = Phase::Selecting;
    }

    fn next_round<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.round_index + 1 >= self.order.len() {
            self.round = None;
            self.phase = Phase::Results;
            log::info!(
                "session finished: score {}, {} perfect matches",
                self.stats.score,
                self.stats.perfect_matches
            );
        } else {
            self.round_index += 1;
            self.load_round(rng);
        }
    }

    fn expect_phase(
        &self,
        action: &'static str,
        allowed: impl Fn(&Phase) -> bool,
    ) -> Result<(), SessionError> {
        if allowed(&self.phase) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                phase: self.phase.name(),
            })
        }
    }

    fn current_round_mut(&mut self, action: &'static str) -> Result<&mut Round, SessionError> {
        let phase = self.phase.name();
        self.round
            .as_mut()
            .ok_or(SessionError::InvalidTransition { action, phase })
    }
}

impl Round {
    fn selection_slot(&self, category: Category) -> Option<usize> {
        self.selections.iter().position(|(selected, _)| *selected == category)
    }

    fn selection(&self, category: Category) -> Option<usize> {
        self.selection_slot(category).map(|slot| self.selections[slot].1)
    }

    fn correct_option(&self, category: Category) -> Option<&AnswerOption> {
        self.options
            .iter()
            .find(|option| option.category == category && option.is_correct)
    }
}

/// Wrong choices are listed first, in the order they were made, followed by
/// correct options left unselected in display order.
fn score_round(round: &Round) -> RoundOutcome {
    let mut correct_count = 0;
    let mut missed = Vec::new();

    for &(category, index) in &round.selections {
        if round.options[index].is_correct {
            correct_count += 1;
        } else if let Some(answer) = round.correct_option(category) {
            missed.push(MissedAttribute {
                category,
                correct: answer.text.clone(),
            });
        }
    }

    missed.extend(
        round
            .options
            .iter()
            .filter(|option| option.is_correct && round.selection(option.category).is_none())
            .map(|option| MissedAttribute {
                category: option.category,
                correct: option.text.clone(),
            }),
    );

    let verdicts = round
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            let selected = round.selection(option.category) == Some(index);
            match (selected, option.is_correct) {
                (true, true) => Verdict::Correct,
                (true, false) => Verdict::Incorrect,
                (false, true) => Verdict::Missed,
                (false, false) => Verdict::Unselected,
            }
        })
        .collect();

    RoundOutcome {
        correct_count,
        verdicts,
        missed,
    }
}
