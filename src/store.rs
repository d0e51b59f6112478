//! The portfolio state store.
//!
//! [`PortfolioStore`] owns the aggregate and is the only place it changes. Each
//! accepted mutation recomputes `progress` and then notifies every subscribed
//! [`PortfolioListener`]. Persistence is one such listener, injected by the
//! application, so the store itself never touches storage.

use crate::canvas::DrawingSurface;
use crate::constants::*;
use crate::curriculum::Curriculum;
use crate::error::{PortfolioError, Result};
use crate::types::*;

/// Receives the aggregate after every accepted mutation.
pub trait PortfolioListener {
    /// Called with the updated aggregate. Errors are reported, never rolled back.
    fn portfolio_changed(&mut self, data: &PortfolioData) -> Result<()>;
}

/// Number of fields that count towards progress for a portfolio of this shape.
pub fn trackable_fields(data: &PortfolioData) -> usize {
    STUDENT_INFO_FIELDS
        + FIELDS_PER_EPISODE * data.episodes.len()
        + FIELDS_PER_WORD * data.vocabulary.len()
        + OBSERVATION_FIELDS
        + data.self_assessment.len()
}

/// Number of tracked fields that are filled in.
pub fn completed_fields(data: &PortfolioData) -> usize {
    let filled = |s: &str| !s.trim().is_empty();

    let student = StudentField::ALL
        .iter()
        .filter(|f| filled(data.student_info.get(**f)))
        .count();
    let episodes: usize = data
        .episodes
        .iter()
        .map(|e| filled(&e.learning) as usize + filled(&e.questions) as usize)
        .sum();
    let vocabulary: usize = data
        .vocabulary
        .iter()
        .map(|v| filled(&v.definition) as usize + filled(&v.example) as usize)
        .sum();
    let observations = filled(&data.observations) as usize;
    let ratings = data.self_assessment.iter().filter(|a| a.rating > 0).count();

    student + episodes + vocabulary + observations + ratings
}

/// `round(completed / total * 100)`; 0 for an empty shape.
pub fn compute_progress(data: &PortfolioData) -> u8 {
    let total = trackable_fields(data);
    if total == 0 {
        return 0;
    }
    let pct = (completed_fields(data) as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Recomputes every derived field of the aggregate in place.
pub fn refresh_derived(data: &mut PortfolioData) {
    for episode in &mut data.episodes {
        episode.refresh_completed();
    }
    data.progress = compute_progress(data);
}

/// Single owner of the portfolio aggregate.
pub struct PortfolioStore {
    curriculum: Curriculum,
    data: PortfolioData,
    listeners: Vec<Box<dyn PortfolioListener>>,
    last_persist_error: Option<String>,
}

impl PortfolioStore {
    /// Creates a store around an existing aggregate. Derived fields are recomputed.
    pub fn new(curriculum: Curriculum, mut data: PortfolioData) -> Self {
        refresh_derived(&mut data);
        Self {
            curriculum,
            data,
            listeners: Vec::new(),
            last_persist_error: None,
        }
    }

    /// Creates a store holding the curriculum's blank portfolio.
    pub fn blank(curriculum: Curriculum) -> Self {
        let data = curriculum.blank_portfolio();
        Self::new(curriculum, data)
    }

    /// Registers a listener notified after every accepted mutation.
    pub fn subscribe(&mut self, listener: Box<dyn PortfolioListener>) {
        self.listeners.push(listener);
    }

    /// The current aggregate.
    pub fn data(&self) -> &PortfolioData {
        &self.data
    }

    /// The curriculum this store was built from.
    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    /// Current completion percentage.
    pub fn progress(&self) -> u8 {
        self.data.progress
    }

    /// Message of the most recent listener failure, if any.
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// Forgets the last listener failure once the user has seen it.
    pub fn dismiss_persist_error(&mut self) {
        self.last_persist_error = None;
    }

    /// Recomputes progress from the current aggregate.
    pub fn compute_progress(&mut self) -> u8 {
        self.data.progress = compute_progress(&self.data);
        self.data.progress
    }

    /// Sets one student-info field.
    pub fn update_student_info(&mut self, field: StudentField, value: impl Into<String>) {
        *self.data.student_info.get_mut(field) = value.into();
        self.commit();
    }

    /// Sets one field of the episode with the given curriculum id.
    pub fn update_episode(
        &mut self,
        id: u32,
        field: EpisodeField,
        value: impl Into<String>,
    ) -> Result<()> {
        let episode = self
            .data
            .episodes
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(PortfolioError::UnknownEpisode(id))?;
        episode.set(field, value.into());
        self.commit();
        Ok(())
    }

    /// Sets the definition or example of the vocabulary word at `index`.
    pub fn update_vocabulary(
        &mut self,
        index: usize,
        field: VocabularyField,
        value: impl Into<String>,
    ) -> Result<()> {
        let len = self.data.vocabulary.len();
        let word = self
            .data
            .vocabulary
            .get_mut(index)
            .ok_or(PortfolioError::IndexOutOfRange {
                list: "vocabulary",
                index,
                len,
            })?;
        word.set(field, value.into());
        self.commit();
        Ok(())
    }

    /// Rates the self-assessment topic at `index` (0..=5).
    pub fn update_self_assessment(&mut self, index: usize, rating: u8) -> Result<()> {
        if rating > MAX_RATING {
            return Err(PortfolioError::RatingOutOfRange(rating));
        }
        let len = self.data.self_assessment.len();
        let entry = self
            .data
            .self_assessment
            .get_mut(index)
            .ok_or(PortfolioError::IndexOutOfRange {
                list: "self-assessment",
                index,
                len,
            })?;
        entry.rating = rating;
        self.commit();
        Ok(())
    }

    /// Replaces the observations journal.
    pub fn set_observations(&mut self, text: impl Into<String>) {
        self.data.observations = text.into();
        self.commit();
    }

    /// Stores the committed canvas snapshot (empty string when cleared).
    pub fn set_canvas_data(&mut self, data_uri: impl Into<String>) {
        self.data.canvas_data = data_uri.into();
        self.commit();
    }

    /// Wipes the drawing surface and resets the stored snapshot.
    pub fn clear_canvas(&mut self, surface: &mut DrawingSurface) {
        surface.clear();
        self.set_canvas_data(String::new());
    }

    fn commit(&mut self) {
        self.compute_progress();
        let mut failure = None;
        for listener in &mut self.listeners {
            if let Err(err) = listener.portfolio_changed(&self.data) {
                log::warn!("Portfolio listener failed: {err}");
                failure = Some(err.to_string());
            }
        }
        // A clean commit means storage has recovered
        if failure.is_none() && self.last_persist_error.is_some() {
            log::info!("Portfolio saved again after an earlier failure");
        }
        self.last_persist_error = failure;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2, Pos2, Rect};
    use proptest::prelude::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Records every notification it receives.
    struct Recorder(Rc<RefCell<Vec<u8>>>);

    impl PortfolioListener for Recorder {
        fn portfolio_changed(&mut self, data: &PortfolioData) -> Result<()> {
            self.0.borrow_mut().push(data.progress);
            Ok(())
        }
    }

    struct Failing;

    impl PortfolioListener for Failing {
        fn portfolio_changed(&mut self, _data: &PortfolioData) -> Result<()> {
            Err(PortfolioError::StorageWrite("quota exceeded".to_string()))
        }
    }

    /// Fails while its shared flag is set.
    struct Flaky(Rc<Cell<bool>>);

    impl PortfolioListener for Flaky {
        fn portfolio_changed(&mut self, _data: &PortfolioData) -> Result<()> {
            if self.0.get() {
                Err(PortfolioError::StorageWrite("full".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn store() -> PortfolioStore {
        PortfolioStore::blank(Curriculum::default())
    }

    #[test]
    fn test_default_curriculum_tracks_51_fields() {
        let store = store();
        assert_eq!(trackable_fields(store.data()), 51);
        assert_eq!(store.progress(), 0);
    }

    #[test]
    fn test_single_episode_fill() {
        let mut store = store();
        store
            .update_episode(3, EpisodeField::Learning, "Crows mimic hawk calls")
            .unwrap();

        assert!(store.data().episodes[2].completed);
        assert_eq!(store.progress(), 2);
    }

    #[test]
    fn test_questions_count_for_progress_but_not_completion() {
        let mut store = store();
        store
            .update_episode(1, EpisodeField::Questions, "Why do crows gather at dusk?")
            .unwrap();

        assert!(!store.data().episodes[0].completed);
        assert_eq!(store.progress(), 2);
    }

    #[test]
    fn test_whitespace_does_not_count() {
        let mut store = store();
        store.update_student_info(StudentField::Name, "   ");
        store.set_observations("\n\t");
        assert_eq!(store.progress(), 0);
    }

    #[test]
    fn test_episode_date_is_not_tracked() {
        let mut store = store();
        store.update_episode(2, EpisodeField::Date, "2026-10-01").unwrap();
        assert_eq!(store.progress(), 0);
        assert_eq!(store.data().episodes[1].date, "2026-10-01");
    }

    #[test]
    fn test_full_portfolio_reaches_100() {
        let mut store = store();
        for field in StudentField::ALL {
            store.update_student_info(field, "x");
        }
        for id in 1..=10 {
            store.update_episode(id, EpisodeField::Learning, "learned").unwrap();
            store.update_episode(id, EpisodeField::Questions, "wondered").unwrap();
        }
        for i in 0..10 {
            store.update_vocabulary(i, VocabularyField::Definition, "means").unwrap();
            store.update_vocabulary(i, VocabularyField::Example, "used").unwrap();
        }
        store.set_observations("Two crows on the fence");
        for i in 0..5 {
            store.update_self_assessment(i, 1).unwrap();
        }
        assert_eq!(store.progress(), 100);
    }

    #[test]
    fn test_rejected_mutations_change_nothing() {
        let mut store = store();
        let calls = Rc::new(RefCell::new(Vec::new()));
        store.subscribe(Box::new(Recorder(calls.clone())));
        let before = store.data().clone();

        assert!(matches!(
            store.update_episode(11, EpisodeField::Learning, "x"),
            Err(PortfolioError::UnknownEpisode(11))
        ));
        assert!(matches!(
            store.update_vocabulary(10, VocabularyField::Example, "x"),
            Err(PortfolioError::IndexOutOfRange { index: 10, len: 10, .. })
        ));
        assert!(matches!(
            store.update_self_assessment(0, 6),
            Err(PortfolioError::RatingOutOfRange(6))
        ));
        assert!(store.update_self_assessment(5, 3).is_err());

        assert_eq!(store.data(), &before);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_every_mutation_notifies_after_recompute() {
        let mut store = store();
        let calls = Rc::new(RefCell::new(Vec::new()));
        store.subscribe(Box::new(Recorder(calls.clone())));

        store.update_student_info(StudentField::School, "Rookery Primary");
        store.set_canvas_data("data:image/png;base64,AAAA");
        store.update_self_assessment(2, 4).unwrap();

        // canvas data is not a tracked field
        assert_eq!(*calls.borrow(), vec![2, 2, 4]);
    }

    #[test]
    fn test_listener_failure_is_kept_not_rolled_back() {
        let mut store = store();
        store.subscribe(Box::new(Failing));

        store.set_observations("A jay burying acorns");

        assert_eq!(store.data().observations, "A jay burying acorns");
        assert!(store.last_persist_error().unwrap().contains("quota exceeded"));
        store.dismiss_persist_error();
        assert!(store.last_persist_error().is_none());
    }

    #[test]
    fn test_successful_save_clears_earlier_failure() {
        let mut store = store();
        let failing = Rc::new(Cell::new(true));
        store.subscribe(Box::new(Flaky(failing.clone())));

        store.set_observations("Crows at the bin");
        assert!(store.last_persist_error().unwrap().contains("full"));

        failing.set(false);
        store.set_observations("Crows at the bin again");
        assert!(store.last_persist_error().is_none());

        failing.set(true);
        store.update_student_info(StudentField::Grade, "4");
        assert!(store.last_persist_error().is_some());
    }

    #[test]
    fn test_clear_canvas_resets_snapshot() {
        let mut store = store();
        let mut surface = DrawingSurface::default();
        let bounds = Rect::from_min_size(
            Pos2::ZERO,
            vec2(CANVAS_WIDTH as f32, CANVAS_HEIGHT as f32),
        );
        surface.pointer_down(pos2(10.0, 10.0), bounds);
        surface.pointer_move(pos2(90.0, 40.0), bounds);
        let uri = surface.pointer_up().unwrap();
        store.set_canvas_data(uri);
        assert!(!store.data().canvas_data.is_empty());

        store.clear_canvas(&mut surface);
        assert_eq!(store.data().canvas_data, "");
        store.clear_canvas(&mut surface);
        assert_eq!(store.data().canvas_data, "");
    }

    #[test]
    fn test_new_recomputes_stale_derived_fields() {
        let curriculum = Curriculum::default();
        let mut data = curriculum.blank_portfolio();
        data.episodes[0].learning = "Ravens play in snow".to_string();
        data.progress = 99;

        let store = PortfolioStore::new(curriculum, data);
        assert!(store.data().episodes[0].completed);
        assert_eq!(store.progress(), 2);
    }

    /// One step of user input against the default curriculum.
    #[derive(Debug, Clone)]
    pub(crate) enum Edit {
        Student(usize, String),
        Episode(u32, bool, String),
        Vocabulary(usize, bool, String),
        Rating(usize, u8),
        Observations(String),
    }

    pub(crate) fn edit() -> impl Strategy<Value = Edit> {
        let text = "[a-z ]{0,8}";
        prop_oneof![
            (0usize..5, text).prop_map(|(i, s)| Edit::Student(i, s)),
            (1u32..=10, any::<bool>(), text).prop_map(|(id, q, s)| Edit::Episode(id, q, s)),
            (0usize..10, any::<bool>(), text).prop_map(|(i, e, s)| Edit::Vocabulary(i, e, s)),
            (0usize..5, 0u8..=5).prop_map(|(i, r)| Edit::Rating(i, r)),
            text.prop_map(Edit::Observations),
        ]
    }

    pub(crate) fn apply(store: &mut PortfolioStore, edit: &Edit) {
        match edit {
            Edit::Student(i, s) => store.update_student_info(StudentField::ALL[*i], s.clone()),
            Edit::Episode(id, questions, s) => {
                let field = if *questions {
                    EpisodeField::Questions
                } else {
                    EpisodeField::Learning
                };
                store.update_episode(*id, field, s.clone()).unwrap();
            }
            Edit::Vocabulary(i, example, s) => {
                let field = if *example {
                    VocabularyField::Example
                } else {
                    VocabularyField::Definition
                };
                store.update_vocabulary(*i, field, s.clone()).unwrap();
            }
            Edit::Rating(i, r) => store.update_self_assessment(*i, *r).unwrap(),
            Edit::Observations(s) => store.set_observations(s.clone()),
        }
    }

    proptest! {
        #[test]
        fn progress_stays_in_range(edits in prop::collection::vec(edit(), 0..60)) {
            let mut store = store();
            for e in &edits {
                apply(&mut store, e);
                prop_assert!(store.progress() <= 100);
                prop_assert_eq!(store.progress(), compute_progress(store.data()));
            }
        }

        #[test]
        fn filling_more_fields_never_lowers_progress(edits in prop::collection::vec(edit(), 0..60)) {
            // Only keep edits that fill a field, never ones that empty it
            let mut store = store();
            let mut last = store.progress();
            for e in edits.iter().map(|e| match e {
                Edit::Student(i, s) => Edit::Student(*i, format!("{s}x")),
                Edit::Episode(id, q, s) => Edit::Episode(*id, *q, format!("{s}x")),
                Edit::Vocabulary(i, ex, s) => Edit::Vocabulary(*i, *ex, format!("{s}x")),
                Edit::Rating(i, r) => Edit::Rating(*i, (*r).max(1)),
                Edit::Observations(s) => Edit::Observations(format!("{s}x")),
            }) {
                apply(&mut store, &e);
                prop_assert!(store.progress() >= last);
                last = store.progress();
            }
        }
    }
}
