use super::item::{Column, ItemModel, ModelIndex, Value};
use super::node::NodeKind;
use super::notify::{ModelEvent, ModelObserver, Notifier};
use super::task_filter::{ResultFilter, TaskFilter};

/// Filter proxy over the flattened list: keeps only the task rows that pass
/// the current [`TaskFilter`].
///
/// Accepted source rows are kept ascending. Plan rows never pass.
#[derive(Debug, Default)]
pub struct FilterModel {
    filter: TaskFilter,
    rows: Vec<usize>,
    notifier: Notifier,
}

impl FilterModel {
    pub fn new(filter: TaskFilter) -> Self {
        FilterModel {
            filter,
            ..FilterModel::default()
        }
    }

    /// Proxy already evaluated against `source`
    pub fn attach(source: &dyn ItemModel, filter: TaskFilter) -> Self {
        let mut model = FilterModel::new(filter);
        model.rows = model.evaluate(source);
        model
    }

    pub fn subscribe(&mut self, observer: Box<dyn ModelObserver>) {
        self.notifier.subscribe(observer);
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Source rows currently shown, in order
    pub fn source_rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn view<'a, S: ItemModel>(&'a self, source: S) -> FilterView<'a, S> {
        FilterView {
            model: self,
            source,
        }
    }

    pub fn set_filter(&mut self, source: &dyn ItemModel, filter: TaskFilter) {
        if filter == self.filter {
            return;
        }
        self.filter = filter;
        self.invalidate(source);
    }

    pub fn set_text_filter(&mut self, source: &dyn ItemModel, text: &str) {
        let filter = self.filter.clone().with_text(text);
        self.set_filter(source, filter);
    }

    pub fn set_result_filter(&mut self, source: &dyn ItemModel, result: &str) {
        let filter = TaskFilter {
            result: ResultFilter::parse(result),
            ..self.filter.clone()
        };
        self.set_filter(source, filter);
    }

    pub fn set_ancestor_filter(&mut self, source: &dyn ItemModel, ancestor: &str) {
        let filter = self.filter.clone().with_ancestor(ancestor);
        self.set_filter(source, filter);
    }

    /// Proxy index for a source row, invalid when the row is filtered out
    pub fn map_from_source(&self, index: &ModelIndex) -> ModelIndex {
        match (index.node(), self.rows.binary_search(&index.row())) {
            (Some(node), Ok(pos)) => ModelIndex::new(pos, index.column(), node),
            _ => ModelIndex::invalid(),
        }
    }

    pub fn map_to_source(&self, source: &dyn ItemModel, index: &ModelIndex) -> ModelIndex {
        let Some(row) = self.rows.get(index.row()) else {
            return ModelIndex::invalid();
        };
        let mapped = source.index(*row, index.column(), &ModelIndex::invalid());
        if index.node().is_some() && mapped.node() == index.node() {
            mapped
        } else {
            ModelIndex::invalid()
        }
    }

    fn accepts(&self, source: &dyn ItemModel, row: usize) -> bool {
        let index = source.index(row, 0, &ModelIndex::invalid());
        if source.kind(&index) != Some(NodeKind::Task) {
            return false;
        }
        self.filter.matches(
            &source.text(&index, Column::Text),
            &source.text(&index, Column::Ancestor),
            source.result(&index).as_ref(),
        )
    }

    fn evaluate(&self, source: &dyn ItemModel) -> Vec<usize> {
        (0..source.row_count(&ModelIndex::invalid()))
            .filter(|row| self.accepts(source, *row))
            .collect()
    }

    /// Re-run the predicates over every row, announcing rows that leave
    /// (last run first) and then rows that join
    fn invalidate(&mut self, source: &dyn ItemModel) {
        let accepted = self.evaluate(source);

        let leaving: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| accepted.binary_search(row).is_err())
            .map(|(pos, _)| pos)
            .collect();
        for (first, last) in runs(&leaving).into_iter().rev() {
            self.remove_rows(first, last);
        }

        let mut pos = 0;
        let mut next = 0;
        while next < accepted.len() {
            if self.rows.get(pos) == Some(&accepted[next]) {
                pos += 1;
                next += 1;
                continue;
            }
            let start = next;
            while next < accepted.len() && self.rows.get(pos) != Some(&accepted[next]) {
                next += 1;
            }
            self.insert_rows(pos, &accepted[start..next]);
            pos += next - start;
        }

        tracing::debug!(rows = self.rows.len(), filter = ?self.filter, "filter applied");
    }

    fn remove_rows(&mut self, first: usize, last: usize) {
        let parent = ModelIndex::invalid();
        self.notifier
            .emit(ModelEvent::RowsAboutToBeRemoved { parent, first, last });
        self.rows.drain(first..=last);
        self.notifier
            .emit(ModelEvent::RowsRemoved { parent, first, last });
    }

    fn insert_rows(&mut self, at: usize, source_rows: &[usize]) {
        if source_rows.is_empty() {
            return;
        }
        let parent = ModelIndex::invalid();
        let (first, last) = (at, at + source_rows.len() - 1);
        self.notifier
            .emit(ModelEvent::RowsAboutToBeInserted { parent, first, last });
        self.rows.splice(at..at, source_rows.iter().copied());
        self.notifier
            .emit(ModelEvent::RowsInserted { parent, first, last });
    }

    fn reset(&mut self, source: &dyn ItemModel) {
        self.notifier.emit(ModelEvent::AboutToReset);
        self.rows = self.evaluate(source);
        self.notifier.emit(ModelEvent::Reset);
    }

    /// Follow one event of the flat source; `source` is already in its
    /// post-event state for done-events
    pub fn source_event(&mut self, source: &dyn ItemModel, event: &ModelEvent) {
        match event {
            ModelEvent::AboutToReset => self.notifier.emit(ModelEvent::AboutToReset),
            ModelEvent::Reset => {
                self.rows = self.evaluate(source);
                self.notifier.emit(ModelEvent::Reset);
            }
            ModelEvent::LayoutChanged => self.reset(source),
            ModelEvent::RowsAboutToBeInserted { .. } => {}
            ModelEvent::RowsInserted { first, last, .. } => {
                let count = last - first + 1;
                for row in &mut self.rows {
                    if *row >= *first {
                        *row += count;
                    }
                }
                let joining: Vec<usize> = (*first..=*last)
                    .filter(|row| self.accepts(source, *row))
                    .collect();
                let at = self.rows.partition_point(|row| row < first);
                self.insert_rows(at, &joining);
            }
            ModelEvent::RowsAboutToBeRemoved { first, last, .. } => {
                let (start, end) = self.span(*first, *last);
                if start < end {
                    self.notifier.emit(ModelEvent::RowsAboutToBeRemoved {
                        parent: ModelIndex::invalid(),
                        first: start,
                        last: end - 1,
                    });
                }
            }
            ModelEvent::RowsRemoved { first, last, .. } => {
                let (start, end) = self.span(*first, *last);
                if start < end {
                    self.rows.drain(start..end);
                    self.notifier.emit(ModelEvent::RowsRemoved {
                        parent: ModelIndex::invalid(),
                        first: start,
                        last: end - 1,
                    });
                }
                let count = last - first + 1;
                for row in &mut self.rows {
                    if *row > *last {
                        *row -= count;
                    }
                }
            }
            ModelEvent::DataChanged { index } => self.source_changed(source, index),
        }
    }

    /// Positions in `rows` holding source rows `first..=last`
    fn span(&self, first: usize, last: usize) -> (usize, usize) {
        (
            self.rows.partition_point(|row| *row < first),
            self.rows.partition_point(|row| *row <= last),
        )
    }

    fn source_changed(&mut self, source: &dyn ItemModel, index: &ModelIndex) {
        let row = index.row();
        let accepted = self.accepts(source, row);
        match self.rows.binary_search(&row) {
            Ok(pos) if accepted => {
                if let Some(node) = index.node() {
                    let index = ModelIndex::new(pos, index.column(), node);
                    self.notifier.emit(ModelEvent::DataChanged { index });
                }
            }
            Ok(pos) => self.remove_rows(pos, pos),
            Err(pos) if accepted => self.insert_rows(pos, &[row]),
            Err(_) => {}
        }
    }
}

/// Group ascending positions into inclusive runs of consecutive values
fn runs(positions: &[usize]) -> Vec<(usize, usize)> {
    let mut out: Vec<(usize, usize)> = Vec::new();
    for &pos in positions {
        match out.last_mut() {
            Some((_, last)) if *last + 1 == pos => *last = pos,
            _ => out.push((pos, pos)),
        }
    }
    out
}

/// Read access to a [`FilterModel`] over its source view
#[derive(Debug, Clone, Copy)]
pub struct FilterView<'a, S> {
    model: &'a FilterModel,
    source: S,
}

impl<S: ItemModel> FilterView<'_, S> {
    pub fn map_to_source(&self, index: &ModelIndex) -> ModelIndex {
        self.model.map_to_source(&self.source, index)
    }

    pub fn map_from_source(&self, index: &ModelIndex) -> ModelIndex {
        self.model.map_from_source(index)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }
}

impl<S: ItemModel> ItemModel for FilterView<'_, S> {
    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if parent.is_valid() || column >= Column::COUNT {
            return ModelIndex::invalid();
        }
        let Some(source_row) = self.model.rows.get(row) else {
            return ModelIndex::invalid();
        };
        self.source
            .index(*source_row, column, &ModelIndex::invalid())
            .node()
            .map_or(ModelIndex::invalid(), |node| {
                ModelIndex::new(row, column, node)
            })
    }

    fn parent(&self, _index: &ModelIndex) -> ModelIndex {
        ModelIndex::invalid()
    }

    fn row_count(&self, parent: &ModelIndex) -> usize {
        if parent.is_valid() { 0 } else { self.model.len() }
    }

    fn get(&self, index: &ModelIndex, column: usize) -> Option<Value> {
        let source = self.map_to_source(index);
        if !source.is_valid() {
            return None;
        }
        self.source.get(&source, column)
    }

    fn kind(&self, index: &ModelIndex) -> Option<NodeKind> {
        self.source.kind(&self.map_to_source(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::Project;
    use crate::model::task::{Outcome, TaskResult};
    use crate::view::flat_model::FlatModel;
    use crate::view::notify::EventLog;
    use crate::view::tree_model::TreeModel;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn research_project() -> Project {
        let mut project = Project::default();
        let plan = project.add_plan();
        plan.ancestor = "John Weir (1801-1870)".into();
        plan.add_task().source = "Granthill Baptisms".into();
        let task = plan.add_task();
        task.source = "Downton Registry".into();
        task.result = Some(
            TaskResult::dated(Outcome::Nil, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap())
                .with_summary("not found"),
        );
        let task = plan.add_task();
        task.source = "Kew Archive".into();
        task.result = Some(TaskResult::dated(
            Outcome::Success,
            NaiveDate::from_ymd_opt(2022, 8, 17).unwrap(),
        ));
        project
    }

    struct Fixture {
        tree: TreeModel,
        flat: FlatModel,
        filter: FilterModel,
        log: EventLog,
    }

    impl Fixture {
        fn new(filter: TaskFilter) -> Self {
            let mut tree = TreeModel::with_project(research_project());
            tree.record_events(true);
            let mut flat = FlatModel::attach(&tree);
            flat.record_events(true);
            let mut filter = FilterModel::attach(&flat.view(&tree), filter);
            let log = EventLog::new();
            filter.subscribe(Box::new(log.clone()));
            Fixture {
                tree,
                flat,
                filter,
                log,
            }
        }

        fn relay(&mut self) {
            for event in self.tree.take_events() {
                self.flat.source_event(&self.tree, &event);
                for flat_event in self.flat.take_events() {
                    self.filter
                        .source_event(&self.flat.view(&self.tree), &flat_event);
                }
            }
        }

        fn sources(&self) -> Vec<String> {
            let view = self.filter.view(self.flat.view(&self.tree));
            (0..view.len())
                .map(|row| view.text(&view.index(row, 0, &ModelIndex::invalid()), Column::Text))
                .collect()
        }

        fn set_filter(&mut self, filter: TaskFilter) {
            let source = self.flat.view(&self.tree);
            self.filter.set_filter(&source, filter);
        }
    }

    #[test]
    fn test_plan_rows_never_pass() {
        let f = Fixture::new(TaskFilter::new());
        assert_eq!(
            f.sources(),
            vec!["Granthill Baptisms", "Downton Registry", "Kew Archive"]
        );
        assert_eq!(f.filter.source_rows(), &[1, 2, 3]);
    }

    #[test]
    fn test_text_filter() {
        let f = Fixture::new(TaskFilter::new().with_text("Gran"));
        assert_eq!(f.sources(), vec!["Granthill Baptisms"]);
    }

    #[test]
    fn test_result_filters() {
        let f = Fixture::new(TaskFilter::new().with_result("open"));
        assert_eq!(f.sources(), vec!["Granthill Baptisms"]);
        let f = Fixture::new(TaskFilter::new().with_result("nil"));
        assert_eq!(f.sources(), vec!["Downton Registry"]);
        let f = Fixture::new(TaskFilter::new().with_result("2023"));
        assert_eq!(f.sources(), vec!["Downton Registry"]);
        let f = Fixture::new(TaskFilter::new().with_result("success"));
        assert_eq!(f.sources(), vec!["Kew Archive"]);
    }

    #[test]
    fn test_intersection_can_be_empty() {
        let f = Fixture::new(TaskFilter::new().with_text("o").with_result("open"));
        assert!(f.sources().is_empty());
    }

    #[test]
    fn test_ancestor_filter() {
        let f = Fixture::new(TaskFilter::new().with_ancestor("Weir"));
        assert_eq!(f.sources().len(), 3);
        let f = Fixture::new(TaskFilter::new().with_ancestor("Smith"));
        assert!(f.sources().is_empty());
    }

    #[test]
    fn test_narrowing_announces_removed_runs_from_the_end() {
        let mut f = Fixture::new(TaskFilter::new());
        f.set_filter(TaskFilter::new().with_text("Kew"));
        let parent = ModelIndex::invalid();
        assert_eq!(
            f.log.take(),
            vec![
                ModelEvent::RowsAboutToBeRemoved {
                    parent,
                    first: 0,
                    last: 1
                },
                ModelEvent::RowsRemoved {
                    parent,
                    first: 0,
                    last: 1
                },
            ]
        );
        assert_eq!(f.sources(), vec!["Kew Archive"]);
    }

    #[test]
    fn test_widening_announces_inserted_runs() {
        let mut f = Fixture::new(TaskFilter::new().with_text("Downton"));
        f.set_filter(TaskFilter::new());
        let parent = ModelIndex::invalid();
        assert_eq!(
            f.log.take(),
            vec![
                ModelEvent::RowsAboutToBeInserted {
                    parent,
                    first: 0,
                    last: 0
                },
                ModelEvent::RowsInserted {
                    parent,
                    first: 0,
                    last: 0
                },
                ModelEvent::RowsAboutToBeInserted {
                    parent,
                    first: 2,
                    last: 2
                },
                ModelEvent::RowsInserted {
                    parent,
                    first: 2,
                    last: 2
                },
            ]
        );
        assert_eq!(f.sources().len(), 3);
    }

    #[test]
    fn test_unchanged_filter_is_silent() {
        let mut f = Fixture::new(TaskFilter::new().with_text("Kew"));
        f.set_filter(TaskFilter::new().with_text("Kew"));
        assert!(f.log.is_empty());
    }

    #[test]
    fn test_edit_moves_task_out_of_open_filter() {
        let mut f = Fixture::new(TaskFilter::new().with_result("open"));
        let plan = f.tree.index(0, 0, &ModelIndex::invalid());
        let first = f.tree.index(0, 0, &plan);
        f.tree.set(
            &first,
            Column::Result.index(),
            TaskResult::new(Outcome::Success).into(),
        );
        f.relay();

        assert!(f.sources().is_empty());
        assert_eq!(f.log.len(), 2);
    }

    #[test]
    fn test_edit_of_visible_row_is_forwarded() {
        let mut f = Fixture::new(TaskFilter::new().with_result("nil"));
        let plan = f.tree.index(0, 0, &ModelIndex::invalid());
        let downton = f.tree.index(1, 0, &plan);
        f.tree
            .set(&downton, Column::Description.index(), "parish chest".into());
        f.relay();

        let events = f.log.take();
        assert_eq!(events.len(), 1);
        let ModelEvent::DataChanged { index } = &events[0] else {
            panic!("expected a data change, got {:?}", events[0]);
        };
        assert_eq!(index.row(), 0);
        assert_eq!(index.node(), downton.node());
    }

    #[test]
    fn test_new_task_joins_open_filter() {
        let mut f = Fixture::new(TaskFilter::new().with_result("open"));
        let plan = f.tree.index(0, 0, &ModelIndex::invalid());
        f.tree.add_node(&plan);
        f.relay();

        assert_eq!(f.filter.source_rows(), &[1, 4]);
        assert_eq!(f.log.len(), 2);
    }

    #[test]
    fn test_removed_rows_shift_the_rest() {
        let mut f = Fixture::new(TaskFilter::new());
        let plan = f.tree.index(0, 0, &ModelIndex::invalid());
        let first = f.tree.index(0, 0, &plan);
        f.tree.delete_node(&first);
        f.relay();

        assert_eq!(f.filter.source_rows(), &[1, 2]);
        assert_eq!(f.sources(), vec!["Downton Registry", "Kew Archive"]);
    }

    #[test]
    fn test_plan_rename_can_change_ancestor_matches() {
        let mut f = Fixture::new(TaskFilter::new().with_ancestor("Weir"));
        let plan = f.tree.index(0, 0, &ModelIndex::invalid());
        f.tree.set(&plan, Column::Text.index(), "John Wier".into());
        f.relay();
        assert!(f.sources().is_empty());
    }

    #[test]
    fn test_map_to_source_and_back() {
        let f = Fixture::new(TaskFilter::new().with_result("success"));
        let view = f.filter.view(f.flat.view(&f.tree));
        let index = view.index(0, 1, &ModelIndex::invalid());
        let source = view.map_to_source(&index);
        assert_eq!(source.row(), 3);
        assert_eq!(source.column(), 1);
        assert_eq!(view.map_from_source(&source), index);
    }

    #[test]
    fn test_runs() {
        assert_eq!(runs(&[0, 1, 2, 5, 7, 8]), vec![(0, 2), (5, 5), (7, 8)]);
        assert!(runs(&[]).is_empty());
    }
}
