use super::*;
use futures::channel::oneshot;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

// =========================================================
// Shared Mock Components
// =========================================================

fn nodes(items: &[(&str, &str)]) -> Vec<CategoryNode> {
    items
        .iter()
        .map(|(id, label)| CategoryNode::new(*id, *label))
        .collect()
}

type Key = (CascadeLevel, String);

/// Catalog that answers from a fixed table, or parks the request on a gate
/// until the test releases it.
#[derive(Clone, Default)]
struct TestCatalog {
    answers: Rc<RefCell<HashMap<Key, HelpdeskResult<Vec<CategoryNode>>>>>,
    gates: Rc<RefCell<HashMap<Key, oneshot::Sender<HelpdeskResult<Vec<CategoryNode>>>>>>,
    gated: Rc<RefCell<Vec<Key>>>,
    /// Operation log to verify calling order
    log: Rc<RefCell<Vec<String>>>,
}

impl TestCatalog {
    fn new() -> Self {
        Self::default()
    }

    fn answer(&self, level: CascadeLevel, parent: &str, result: HelpdeskResult<Vec<CategoryNode>>) {
        self.answers
            .borrow_mut()
            .insert((level, parent.to_string()), result);
    }

    /// Requests for this key wait until `release` is called
    fn gate(&self, level: CascadeLevel, parent: &str) {
        self.gated.borrow_mut().push((level, parent.to_string()));
    }

    fn release(&self, level: CascadeLevel, parent: &str, result: HelpdeskResult<Vec<CategoryNode>>) {
        let sender = self
            .gates
            .borrow_mut()
            .remove(&(level, parent.to_string()))
            .expect("request was not in flight");
        let _ = sender.send(result);
    }
}

#[async_trait::async_trait(?Send)]
impl CatalogSource for TestCatalog {
    async fn fetch_options(&self, request: &FetchRequest) -> HelpdeskResult<Vec<CategoryNode>> {
        let parent = match request.level {
            CascadeLevel::Category => request.ticket_type.as_str().to_string(),
            _ => request.parent_id.clone(),
        };
        self.log
            .borrow_mut()
            .push(format!("fetch:{}:{}", request.level, parent));
        let key = (request.level, parent);

        if self.gated.borrow().contains(&key) {
            let (tx, rx) = oneshot::channel();
            self.gates.borrow_mut().insert(key, tx);
            return rx
                .await
                .unwrap_or_else(|_| Err(HelpdeskError::Transport("gate dropped".into())));
        }

        self.answers
            .borrow()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn network_catalog() -> TestCatalog {
    let catalog = TestCatalog::new();
    catalog.answer(
        CascadeLevel::Category,
        "Incident",
        Ok(nodes(&[("1", "Network"), ("2", "Hardware")])),
    );
    catalog.answer(CascadeLevel::Subcategory, "1", Ok(nodes(&[("10", "VPN")])));
    catalog.answer(
        CascadeLevel::Subcategory,
        "2",
        Ok(nodes(&[("20", "Laptop"), ("21", "Printer")])),
    );
    catalog.answer(
        CascadeLevel::Item,
        "10",
        Ok(nodes(&[("100", "VPN not connecting")])),
    );
    catalog.answer(CascadeLevel::Item, "20", Ok(nodes(&[("200", "Screen broken")])));
    catalog
}

/// State with categories already loaded for Incident tickets
fn loaded_state() -> CascadeState {
    let mut state = CascadeState::new();
    let req = state.initialize(TicketType::Incident);
    state
        .apply(&req, Ok(nodes(&[("1", "Network"), ("2", "Hardware")])))
        .unwrap();
    state
}

// =========================================================
// CascadeState
// =========================================================

#[test]
fn test_initialize_marks_categories_loading() {
    let mut state = CascadeState::new();
    let req = state.initialize(TicketType::Service);

    assert_eq!(req.level, CascadeLevel::Category);
    assert_eq!(req.ticket_type, TicketType::Service);
    assert!(state.loading_flags().categories);
    assert_eq!(state.ticket_type(), Some(TicketType::Service));
}

#[test]
fn test_select_category_clears_downstream_synchronously() {
    let mut state = loaded_state();
    let req = state.select_category("1").unwrap().unwrap();
    state.apply(&req, Ok(nodes(&[("10", "VPN")]))).unwrap();
    let req = state.select_subcategory("10").unwrap().unwrap();
    state
        .apply(&req, Ok(nodes(&[("100", "VPN not connecting")])))
        .unwrap();
    state.select_item("100").unwrap();

    let pending = state.select_category("2").unwrap().unwrap();

    assert_eq!(pending.parent_id, "2");
    assert_eq!(state.selected(CascadeLevel::Subcategory), None);
    assert_eq!(state.selected(CascadeLevel::Item), None);
    assert!(state.options(CascadeLevel::Subcategory).is_empty());
    assert!(state.options(CascadeLevel::Item).is_empty());
    assert_eq!(state.status(CascadeLevel::Item), &LevelStatus::Idle);
    assert!(state.loading_flags().subcategories);
}

#[test]
fn test_clear_category_resets_regardless_of_in_flight() {
    let mut state = loaded_state();
    let in_flight = state.select_category("1").unwrap().unwrap();

    assert_eq!(state.select_category("").unwrap(), None);
    assert_eq!(state.selected(CascadeLevel::Category), None);
    assert_eq!(state.selected(CascadeLevel::Subcategory), None);
    assert_eq!(state.selected(CascadeLevel::Item), None);
    assert!(state.options(CascadeLevel::Subcategory).is_empty());
    assert_eq!(state.loading_flags(), LoadingFlags {
        categories: false,
        subcategories: false,
        items: false,
    });

    // The old response arrives after the clear and must be dropped
    assert_eq!(state.apply(&in_flight, Ok(nodes(&[("10", "VPN")]))), Ok(false));
    assert!(state.options(CascadeLevel::Subcategory).is_empty());
}

#[test]
fn test_superseded_category_response_is_discarded() {
    let mut state = loaded_state();
    let first = state.select_category("1").unwrap().unwrap();
    let second = state.select_category("2").unwrap().unwrap();

    // Category 1 resolves while category 2 is still loading
    assert_eq!(state.apply(&first, Ok(nodes(&[("10", "VPN")]))), Ok(false));
    assert!(state.options(CascadeLevel::Subcategory).is_empty());
    assert!(state.is_loading(CascadeLevel::Subcategory));

    assert_eq!(
        state.apply(&second, Ok(nodes(&[("20", "Laptop")]))),
        Ok(true)
    );
    assert_eq!(
        state.options(CascadeLevel::Subcategory),
        nodes(&[("20", "Laptop")]).as_slice()
    );
}

#[test]
fn test_late_response_after_newer_one_is_discarded() {
    let mut state = loaded_state();
    let first = state.select_category("1").unwrap().unwrap();
    let second = state.select_category("2").unwrap().unwrap();

    state.apply(&second, Ok(nodes(&[("20", "Laptop")]))).unwrap();
    assert_eq!(state.apply(&first, Ok(nodes(&[("10", "VPN")]))), Ok(false));
    assert_eq!(
        state.options(CascadeLevel::Subcategory),
        nodes(&[("20", "Laptop")]).as_slice()
    );
}

#[test]
fn test_reselecting_same_category_supersedes_previous_fetch() {
    let mut state = loaded_state();
    let first = state.select_category("1").unwrap().unwrap();
    let again = state.select_category("1").unwrap().unwrap();

    assert_ne!(first.generation, again.generation);
    assert_eq!(state.apply(&first, Ok(nodes(&[("10", "VPN")]))), Ok(false));
    assert_eq!(state.apply(&again, Ok(nodes(&[("11", "Wi-Fi")]))), Ok(true));
}

#[test]
fn test_unknown_option_leaves_state_untouched() {
    let mut state = loaded_state();
    let req = state.select_category("1").unwrap().unwrap();
    state.apply(&req, Ok(nodes(&[("10", "VPN")]))).unwrap();
    let before = state.clone();

    let err = state.select_category("99").unwrap_err();
    assert_eq!(
        err,
        HelpdeskError::UnknownOption {
            level: CascadeLevel::Category,
            id: "99".into()
        }
    );
    assert_eq!(state, before);

    assert!(state.select_item("100").is_err());
}

#[test]
fn test_fetch_failure_moves_level_to_error_and_retry_recovers() {
    let mut state = loaded_state();
    let req = state.select_category("1").unwrap().unwrap();

    let err = state
        .apply(&req, Err(HelpdeskError::Transport("connection reset".into())))
        .unwrap_err();
    assert_eq!(err, HelpdeskError::Transport("connection reset".into()));
    assert_eq!(
        state.error(CascadeLevel::Subcategory),
        Some("network error: connection reset")
    );
    assert!(state.options(CascadeLevel::Subcategory).is_empty());

    let retry = state.retry(CascadeLevel::Subcategory).unwrap();
    assert_eq!(retry.parent_id, "1");
    assert!(state.is_loading(CascadeLevel::Subcategory));
    assert_eq!(state.apply(&retry, Ok(nodes(&[("10", "VPN")]))), Ok(true));
    assert_eq!(state.status(CascadeLevel::Subcategory), &LevelStatus::Loaded);
}

#[test]
fn test_retry_without_parent_is_noop() {
    let mut state = loaded_state();
    assert_eq!(state.retry(CascadeLevel::Item), None);
    assert_eq!(CascadeState::new().retry(CascadeLevel::Category), None);
}

#[test]
fn test_selection_incomplete_iff_any_level_unresolved() {
    let mut state = loaded_state();
    assert_eq!(
        state.selection(),
        Err(HelpdeskError::IncompleteSelection {
            level: CascadeLevel::Category
        })
    );

    let req = state.select_category("1").unwrap().unwrap();
    assert_eq!(
        state.selection(),
        Err(HelpdeskError::IncompleteSelection {
            level: CascadeLevel::Subcategory
        })
    );
    state.apply(&req, Ok(nodes(&[("10", "VPN")]))).unwrap();
    let req = state.select_subcategory("10").unwrap().unwrap();

    // Items still loading
    assert_eq!(
        state.selection(),
        Err(HelpdeskError::IncompleteSelection {
            level: CascadeLevel::Item
        })
    );
    state
        .apply(&req, Ok(nodes(&[("100", "VPN not connecting")])))
        .unwrap();
    state.select_item("100").unwrap();

    assert_eq!(
        state.selection().unwrap(),
        SelectionLabels {
            category: "Network".into(),
            subcategory: "VPN".into(),
            item: "VPN not connecting".into(),
        }
    );
}

#[test]
fn test_reset_invalidates_everything() {
    let mut state = loaded_state();
    let in_flight = state.select_category("2").unwrap().unwrap();

    state.reset();
    assert_eq!(state.ticket_type(), None);
    assert!(state.options(CascadeLevel::Category).is_empty());
    assert_eq!(state.apply(&in_flight, Ok(nodes(&[("20", "Laptop")]))), Ok(false));

    // Generations keep increasing across resets
    let req = state.initialize(TicketType::Incident);
    assert!(req.generation > in_flight.generation);
}

#[test]
fn test_type_change_discards_old_category_response() {
    let mut state = CascadeState::new();
    let incident = state.initialize(TicketType::Incident);
    let service = state.initialize(TicketType::Service);

    assert_eq!(state.apply(&incident, Ok(nodes(&[("1", "Network")]))), Ok(false));
    assert_eq!(state.apply(&service, Ok(nodes(&[("5", "Access")]))), Ok(true));
    assert_eq!(state.options(CascadeLevel::Category), nodes(&[("5", "Access")]).as_slice());
}

// =========================================================
// SelectionResolver
// =========================================================

#[tokio::test]
async fn test_end_to_end_selection() {
    let catalog = network_catalog();
    let resolver = SelectionResolver::new(catalog.clone());

    resolver.initialize(TicketType::Incident).await.unwrap();
    assert_eq!(
        resolver.with_state(|s| s.options(CascadeLevel::Category).to_vec()),
        nodes(&[("1", "Network"), ("2", "Hardware")])
    );

    resolver.select_category("1").await.unwrap();
    resolver.with_state(|s| {
        assert_eq!(s.options(CascadeLevel::Subcategory), nodes(&[("10", "VPN")]).as_slice());
        assert!(!s.loading_flags().subcategories);
    });

    resolver.select_subcategory("10").await.unwrap();
    resolver.select_item("100").unwrap();

    assert_eq!(
        resolver.selection().unwrap(),
        SelectionLabels {
            category: "Network".into(),
            subcategory: "VPN".into(),
            item: "VPN not connecting".into(),
        }
    );
    assert_eq!(
        *catalog.log.borrow(),
        vec![
            "fetch:category:Incident",
            "fetch:subcategory:1",
            "fetch:item:10"
        ]
    );
}

#[tokio::test]
async fn test_loading_flag_visible_while_fetch_in_flight() {
    let catalog = network_catalog();
    catalog.gate(CascadeLevel::Subcategory, "1");
    let resolver = SelectionResolver::new(catalog.clone());
    resolver.initialize(TicketType::Incident).await.unwrap();

    let select = resolver.select_category("1");
    let observe = async {
        tokio::task::yield_now().await;
        assert!(resolver.with_state(|s| s.loading_flags().subcategories));
        catalog.release(CascadeLevel::Subcategory, "1", Ok(nodes(&[("10", "VPN")])));
    };
    let (result, ()) = futures::join!(select, observe);
    result.unwrap();

    resolver.with_state(|s| {
        assert!(!s.loading_flags().subcategories);
        assert_eq!(s.options(CascadeLevel::Subcategory), nodes(&[("10", "VPN")]).as_slice());
    });
}

#[tokio::test]
async fn test_race_between_category_selections() {
    let catalog = network_catalog();
    catalog.gate(CascadeLevel::Subcategory, "1");
    catalog.gate(CascadeLevel::Subcategory, "2");
    let resolver = SelectionResolver::new(catalog.clone());
    resolver.initialize(TicketType::Incident).await.unwrap();

    let first = resolver.select_category("1");
    let second = resolver.select_category("2");
    let driver = async {
        tokio::task::yield_now().await;
        catalog.release(CascadeLevel::Subcategory, "2", Ok(nodes(&[("20", "Laptop")])));
        tokio::task::yield_now().await;
        // Category 1 answers last, after category 2 is already shown
        catalog.release(CascadeLevel::Subcategory, "1", Ok(nodes(&[("10", "VPN")])));
    };
    let (r1, r2, ()) = futures::join!(first, second, driver);
    r1.unwrap();
    r2.unwrap();

    let state = resolver.state();
    assert_eq!(state.selected(CascadeLevel::Category), Some("2"));
    assert_eq!(
        state.options(CascadeLevel::Subcategory),
        nodes(&[("20", "Laptop")]).as_slice()
    );
}

#[tokio::test]
async fn test_stale_failure_is_not_reported() {
    let catalog = network_catalog();
    catalog.gate(CascadeLevel::Subcategory, "1");
    let resolver = SelectionResolver::new(catalog.clone());
    resolver.initialize(TicketType::Incident).await.unwrap();

    let first = resolver.select_category("1");
    let driver = async {
        tokio::task::yield_now().await;
        resolver.select_category("2").await.unwrap();
        catalog.release(
            CascadeLevel::Subcategory,
            "1",
            Err(HelpdeskError::Transport("reset".into())),
        );
    };
    let (r1, ()) = futures::join!(first, driver);

    assert!(r1.is_ok());
    let state = resolver.state();
    assert_eq!(state.status(CascadeLevel::Subcategory), &LevelStatus::Loaded);
    assert_eq!(state.options(CascadeLevel::Subcategory).len(), 2);
}

#[tokio::test]
async fn test_initialize_failure_surfaces_error() {
    let catalog = TestCatalog::new();
    catalog.answer(
        CascadeLevel::Category,
        "Service",
        Err(HelpdeskError::Status {
            status: 503,
            message: "maintenance".into(),
        }),
    );
    let resolver = SelectionResolver::new(catalog);

    let err = resolver.initialize(TicketType::Service).await.unwrap_err();
    assert_eq!(err.status_code(), Some(503));
    resolver.with_state(|s| {
        assert!(s.options(CascadeLevel::Category).is_empty());
        assert!(s.error(CascadeLevel::Category).is_some());
    });
}

#[tokio::test]
async fn test_subcategory_change_clears_item() {
    let resolver = SelectionResolver::new(network_catalog());
    resolver.initialize(TicketType::Incident).await.unwrap();
    resolver.select_category("2").await.unwrap();
    resolver.select_subcategory("20").await.unwrap();
    resolver.select_item("200").unwrap();

    resolver.select_subcategory("21").await.unwrap();
    resolver.with_state(|s| {
        assert_eq!(s.selected(CascadeLevel::Subcategory), Some("21"));
        assert_eq!(s.selected(CascadeLevel::Item), None);
        assert_eq!(s.status(CascadeLevel::Item), &LevelStatus::Loaded);
        assert!(s.options(CascadeLevel::Item).is_empty());
    });
    assert_eq!(
        resolver.selection(),
        Err(HelpdeskError::IncompleteSelection {
            level: CascadeLevel::Item
        })
    );
}
