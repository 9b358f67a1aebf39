// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use arya_api::{
    ActivityRepository, AryaSamajRepository, Client, EkalAryaRepository, FamilyRepository,
};
use arya_app::{
    ActivityShort, AppError, AryaSamajListItem, DEFAULT_PAGE_SIZE, FamilyShort, ListController,
    MemberShort, Page, PageRequest, PageStore, PaginatedRepository, ScreenKey,
};
use arya_testkit::{AryaFaker, ScriptedRepository};
use arya_tui::{AppRuntime, InternalEvent, ListRow, ListView, PageOutcome};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use tracing::debug;

type SharedRepository<T> = Arc<dyn PaginatedRepository<T> + Send + Sync>;
type WrapOutcome<T> = fn(PageRequest, Result<Page<T>, AppError>) -> PageOutcome;

pub const DEMO_SEED: u64 = 42;
pub const DEMO_LATENCY: Duration = Duration::from_millis(350);
const DEMO_RECORDS: usize = 95;

/// One list screen: its repository, the live controller, and the pages it
/// parked when it last went off-stage.
struct ScreenSlot<T> {
    repo: SharedRepository<T>,
    controller: ListController<T>,
    parked: PageStore<T>,
    wrap: WrapOutcome<T>,
    page_size: usize,
    debounce: Duration,
}

impl<T: ListRow + Send + 'static> ScreenSlot<T> {
    fn new(
        screen: ScreenKey,
        repo: SharedRepository<T>,
        wrap: WrapOutcome<T>,
        page_size: usize,
        debounce: Duration,
    ) -> Self {
        Self {
            repo,
            controller: Self::controller(screen, page_size, debounce),
            parked: PageStore::new(),
            wrap,
            page_size,
            debounce,
        }
    }

    fn controller(screen: ScreenKey, page_size: usize, debounce: Duration) -> ListController<T> {
        ListController::new(screen, page_size, debounce).with_dedupe(T::row_id)
    }

    fn dispatch(&self, request: PageRequest, tx: &Sender<InternalEvent>) {
        let repo = Arc::clone(&self.repo);
        let wrap = self.wrap;
        let sender = tx.clone();
        thread::spawn(move || {
            let result = repo.fetch(&request);
            let _ = sender.send(InternalEvent::PageLoaded(wrap(request, result)));
        });
    }

    fn dispatch_some(&self, request: Option<PageRequest>, tx: &Sender<InternalEvent>) -> bool {
        match request {
            Some(request) => {
                self.dispatch(request, tx);
                true
            }
            None => false,
        }
    }
}

trait ListScreen {
    fn view(&self, now: OffsetDateTime) -> ListView;
    fn enter(&mut self, tx: &Sender<InternalEvent>);
    fn leave(&mut self);
    fn update_search(&mut self, query: &str, now: Instant, tx: &Sender<InternalEvent>);
    fn poll_search(&mut self, now: Instant, tx: &Sender<InternalEvent>);
    fn load_next_page(&mut self, tx: &Sender<InternalEvent>) -> bool;
    fn retry(&mut self, tx: &Sender<InternalEvent>);
    fn refresh(&mut self, tx: &Sender<InternalEvent>);
    fn invalidate(&mut self);
    fn set_page_size(&mut self, page_size: usize);
    fn load_blocking(&mut self) -> ListView;
}

impl<T: ListRow + Send + 'static> ListScreen for ScreenSlot<T> {
    fn view(&self, now: OffsetDateTime) -> ListView {
        ListView::from_controller(&self.controller, now)
    }

    fn enter(&mut self, tx: &Sender<InternalEvent>) {
        let screen = self.controller.screen();
        if let Some(snapshot) = self.parked.take(screen) {
            debug!(
                screen = screen.as_str(),
                items = snapshot.state.items.len(),
                "restored parked pages"
            );
            self.controller.restore(snapshot);
        }
        let request = self.controller.ensure_loaded();
        self.dispatch_some(request, tx);
    }

    fn leave(&mut self) {
        let screen = self.controller.screen();
        let snapshot = self.controller.snapshot();
        self.parked.save(screen, snapshot);
        self.controller = Self::controller(screen, self.page_size, self.debounce);
    }

    fn update_search(&mut self, query: &str, now: Instant, tx: &Sender<InternalEvent>) {
        let request = self.controller.search_with_debounce(query, now);
        self.dispatch_some(request, tx);
    }

    fn poll_search(&mut self, now: Instant, tx: &Sender<InternalEvent>) {
        let request = self.controller.poll_debounce(now);
        self.dispatch_some(request, tx);
    }

    fn load_next_page(&mut self, tx: &Sender<InternalEvent>) -> bool {
        let request = self.controller.load_next_page();
        self.dispatch_some(request, tx)
    }

    fn retry(&mut self, tx: &Sender<InternalEvent>) {
        let request = self.controller.retry();
        self.dispatch(request, tx);
    }

    fn refresh(&mut self, tx: &Sender<InternalEvent>) {
        self.controller.discard_unfiltered();
        let request = if self.controller.state().is_filtered() {
            let term = self.controller.state().current_search_term.clone();
            self.controller.begin_search(term, true)
        } else {
            self.controller.begin_load(true)
        };
        self.dispatch(request, tx);
    }

    fn invalidate(&mut self) {
        self.parked.invalidate(self.controller.screen());
    }

    fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.controller.set_page_size(page_size);
    }

    fn load_blocking(&mut self) -> ListView {
        let request = self.controller.begin_load(true);
        self.controller.run(self.repo.as_ref(), request);
        self.view(OffsetDateTime::now_utc())
    }
}

/// Screens whose cached pages go stale when a record on `screen` is deleted.
fn affected_screens(screen: ScreenKey) -> &'static [ScreenKey] {
    match screen {
        ScreenKey::EkalArya => &[ScreenKey::EkalArya, ScreenKey::AryaSamaj],
        ScreenKey::AryaPariwar => &[ScreenKey::AryaPariwar, ScreenKey::EkalArya],
        ScreenKey::AryaSamaj => &[ScreenKey::AryaSamaj],
        ScreenKey::Activities => &[ScreenKey::Activities],
    }
}

pub struct ListRuntime {
    members: ScreenSlot<MemberShort>,
    families: ScreenSlot<FamilyShort>,
    arya_samajs: ScreenSlot<AryaSamajListItem>,
    activities: ScreenSlot<ActivityShort>,
    client: Option<Client>,
    fixed_page_size: bool,
}

impl ListRuntime {
    /// `page_size` of `None` lets the terminal width pick it.
    pub fn remote(client: Client, page_size: Option<usize>, debounce: Duration) -> Self {
        let fixed_page_size = page_size.is_some();
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        Self {
            members: ScreenSlot::new(
                ScreenKey::EkalArya,
                Arc::new(EkalAryaRepository::new(client.clone())),
                PageOutcome::Members,
                page_size,
                debounce,
            ),
            families: ScreenSlot::new(
                ScreenKey::AryaPariwar,
                Arc::new(FamilyRepository::new(client.clone())),
                PageOutcome::Families,
                page_size,
                debounce,
            ),
            arya_samajs: ScreenSlot::new(
                ScreenKey::AryaSamaj,
                Arc::new(AryaSamajRepository::new(client.clone())),
                PageOutcome::AryaSamajs,
                page_size,
                debounce,
            ),
            activities: ScreenSlot::new(
                ScreenKey::Activities,
                Arc::new(ActivityRepository::new(client.clone())),
                PageOutcome::Activities,
                page_size,
                debounce,
            ),
            client: Some(client),
            fixed_page_size,
        }
    }

    /// Seeded in-memory records with artificial latency, for trying the UI
    /// without a backend.
    pub fn demo(
        seed: u64,
        latency: Duration,
        page_size: Option<usize>,
        debounce: Duration,
    ) -> Self {
        let fixed_page_size = page_size.is_some();
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        let mut faker = AryaFaker::new(seed);
        Self {
            members: ScreenSlot::new(
                ScreenKey::EkalArya,
                Arc::new(
                    ScriptedRepository::new(faker.members(DEMO_RECORDS)).with_latency(latency),
                ),
                PageOutcome::Members,
                page_size,
                debounce,
            ),
            families: ScreenSlot::new(
                ScreenKey::AryaPariwar,
                Arc::new(
                    ScriptedRepository::new(faker.families(DEMO_RECORDS)).with_latency(latency),
                ),
                PageOutcome::Families,
                page_size,
                debounce,
            ),
            arya_samajs: ScreenSlot::new(
                ScreenKey::AryaSamaj,
                Arc::new(
                    ScriptedRepository::new(faker.arya_samajs(DEMO_RECORDS))
                        .with_latency(latency),
                ),
                PageOutcome::AryaSamajs,
                page_size,
                debounce,
            ),
            activities: ScreenSlot::new(
                ScreenKey::Activities,
                Arc::new(
                    ScriptedRepository::new(faker.activities(DEMO_RECORDS)).with_latency(latency),
                ),
                PageOutcome::Activities,
                page_size,
                debounce,
            ),
            client: None,
            fixed_page_size,
        }
    }

    fn slot(&self, screen: ScreenKey) -> &dyn ListScreen {
        match screen {
            ScreenKey::EkalArya => &self.members,
            ScreenKey::AryaPariwar => &self.families,
            ScreenKey::AryaSamaj => &self.arya_samajs,
            ScreenKey::Activities => &self.activities,
        }
    }

    fn slot_mut(&mut self, screen: ScreenKey) -> &mut dyn ListScreen {
        match screen {
            ScreenKey::EkalArya => &mut self.members,
            ScreenKey::AryaPariwar => &mut self.families,
            ScreenKey::AryaSamaj => &mut self.arya_samajs,
            ScreenKey::Activities => &mut self.activities,
        }
    }

    /// Load the first page of `screen` on the calling thread.
    pub fn load_first_page(&mut self, screen: ScreenKey) -> Result<ListView> {
        let view = self.slot_mut(screen).load_blocking();
        if let Some(error) = &view.error {
            bail!("load {}: {error}", screen.as_str());
        }
        Ok(view)
    }

    fn invalidate_affected(&mut self, screen: ScreenKey) {
        for affected in affected_screens(screen) {
            self.slot_mut(*affected).invalidate();
        }
    }
}

impl AppRuntime for ListRuntime {
    fn list_view(&self, screen: ScreenKey) -> ListView {
        self.slot(screen).view(OffsetDateTime::now_utc())
    }

    fn enter_screen(&mut self, screen: ScreenKey, tx: &Sender<InternalEvent>) -> Result<()> {
        self.slot_mut(screen).enter(tx);
        Ok(())
    }

    fn leave_screen(&mut self, screen: ScreenKey) {
        self.slot_mut(screen).leave();
    }

    fn update_search(
        &mut self,
        screen: ScreenKey,
        query: &str,
        now: Instant,
        tx: &Sender<InternalEvent>,
    ) -> Result<()> {
        self.slot_mut(screen).update_search(query, now, tx);
        Ok(())
    }

    fn poll_search(
        &mut self,
        screen: ScreenKey,
        now: Instant,
        tx: &Sender<InternalEvent>,
    ) -> Result<()> {
        self.slot_mut(screen).poll_search(now, tx);
        Ok(())
    }

    fn load_next_page(&mut self, screen: ScreenKey, tx: &Sender<InternalEvent>) -> Result<bool> {
        Ok(self.slot_mut(screen).load_next_page(tx))
    }

    fn retry(&mut self, screen: ScreenKey, tx: &Sender<InternalEvent>) -> Result<()> {
        self.slot_mut(screen).retry(tx);
        Ok(())
    }

    fn refresh(&mut self, screen: ScreenKey, tx: &Sender<InternalEvent>) -> Result<()> {
        self.slot_mut(screen).refresh(tx);
        Ok(())
    }

    fn delete_row(
        &mut self,
        screen: ScreenKey,
        id: &str,
        tx: &Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| anyhow!("delete is not available in demo mode"))?;
        client.delete_record(screen, id)?;
        self.invalidate_affected(screen);
        self.slot_mut(screen).refresh(tx);
        Ok(())
    }

    fn apply_page(&mut self, outcome: PageOutcome) -> bool {
        match outcome {
            PageOutcome::Members(request, result) => {
                self.members.controller.complete(&request, result)
            }
            PageOutcome::Families(request, result) => {
                self.families.controller.complete(&request, result)
            }
            PageOutcome::AryaSamajs(request, result) => {
                self.arya_samajs.controller.complete(&request, result)
            }
            PageOutcome::Activities(request, result) => {
                self.activities.controller.complete(&request, result)
            }
        }
    }

    fn set_page_size_hint(&mut self, page_size: usize) {
        if self.fixed_page_size {
            return;
        }
        debug!(page_size, "page size hint applied");
        for screen in ScreenKey::ALL {
            self.slot_mut(screen).set_page_size(page_size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DEMO_SEED, ListRuntime};
    use anyhow::{Result, anyhow};
    use arya_api::Client;
    use arya_app::ScreenKey;
    use arya_tui::{AppRuntime, InternalEvent};
    use std::io::Read;
    use std::sync::mpsc::{self, Receiver};
    use std::thread;
    use std::time::{Duration, Instant};
    use tiny_http::{Header, Response, Server};

    const PAGE_SIZE: usize = 30;
    const WINDOW: Duration = Duration::from_millis(500);

    fn demo() -> ListRuntime {
        ListRuntime::demo(DEMO_SEED, Duration::ZERO, Some(PAGE_SIZE), WINDOW)
    }

    fn next_event(rx: &Receiver<InternalEvent>) -> Result<InternalEvent> {
        rx.recv_timeout(Duration::from_secs(5))
            .map_err(|error| anyhow!("no page arrived: {error}"))
    }

    fn apply_next(runtime: &mut ListRuntime, rx: &Receiver<InternalEvent>) -> Result<bool> {
        match next_event(rx)? {
            InternalEvent::PageLoaded(outcome) => Ok(runtime.apply_page(outcome)),
            other => Err(anyhow!("unexpected event {other:?}")),
        }
    }

    #[test]
    fn entering_a_screen_loads_its_first_page() -> Result<()> {
        let mut runtime = demo();
        let (tx, rx) = mpsc::channel();

        runtime.enter_screen(ScreenKey::EkalArya, &tx)?;
        assert!(runtime.list_view(ScreenKey::EkalArya).is_initial_loading);

        assert!(apply_next(&mut runtime, &rx)?);
        let view = runtime.list_view(ScreenKey::EkalArya);
        assert_eq!(view.len(), PAGE_SIZE);
        assert!(view.has_next_page);

        assert!(runtime.load_next_page(ScreenKey::EkalArya, &tx)?);
        assert!(apply_next(&mut runtime, &rx)?);
        assert_eq!(runtime.list_view(ScreenKey::EkalArya).len(), 2 * PAGE_SIZE);
        Ok(())
    }

    #[test]
    fn parked_screen_comes_back_without_a_fetch() -> Result<()> {
        let mut runtime = demo();
        let (tx, rx) = mpsc::channel();

        runtime.enter_screen(ScreenKey::AryaSamaj, &tx)?;
        apply_next(&mut runtime, &rx)?;
        let before = runtime.list_view(ScreenKey::AryaSamaj);

        runtime.leave_screen(ScreenKey::AryaSamaj);
        assert!(runtime.list_view(ScreenKey::AryaSamaj).is_empty());

        runtime.enter_screen(ScreenKey::AryaSamaj, &tx)?;
        assert_eq!(runtime.list_view(ScreenKey::AryaSamaj), before);
        assert!(rx.try_recv().is_err());
        Ok(())
    }

    #[test]
    fn page_for_a_parked_screen_is_dropped() -> Result<()> {
        let mut runtime = demo();
        let (tx, rx) = mpsc::channel();

        runtime.enter_screen(ScreenKey::Activities, &tx)?;
        runtime.leave_screen(ScreenKey::Activities);
        assert!(!apply_next(&mut runtime, &rx)?);

        runtime.enter_screen(ScreenKey::Activities, &tx)?;
        assert!(runtime.list_view(ScreenKey::Activities).is_initial_loading);
        assert!(apply_next(&mut runtime, &rx)?);
        assert_eq!(runtime.list_view(ScreenKey::Activities).len(), PAGE_SIZE);
        Ok(())
    }

    #[test]
    fn invalidated_screen_reloads_on_entry() -> Result<()> {
        let mut runtime = demo();
        let (tx, rx) = mpsc::channel();

        runtime.enter_screen(ScreenKey::AryaSamaj, &tx)?;
        apply_next(&mut runtime, &rx)?;
        runtime.leave_screen(ScreenKey::AryaSamaj);

        runtime.invalidate_affected(ScreenKey::EkalArya);
        runtime.enter_screen(ScreenKey::AryaSamaj, &tx)?;
        assert!(runtime.list_view(ScreenKey::AryaSamaj).is_initial_loading);
        assert!(apply_next(&mut runtime, &rx)?);
        Ok(())
    }

    #[test]
    fn debounced_search_fires_after_window() -> Result<()> {
        let mut runtime = demo();
        let (tx, rx) = mpsc::channel();

        runtime.enter_screen(ScreenKey::EkalArya, &tx)?;
        apply_next(&mut runtime, &rx)?;
        let name = runtime.list_view(ScreenKey::EkalArya).rows[0][0].clone();
        let term = name.split_whitespace().next().unwrap_or_default().to_owned();

        let start = Instant::now();
        runtime.update_search(ScreenKey::EkalArya, &term, start, &tx)?;
        runtime.poll_search(ScreenKey::EkalArya, start + Duration::from_millis(100), &tx)?;
        assert!(rx.try_recv().is_err());

        runtime.poll_search(ScreenKey::EkalArya, start + WINDOW, &tx)?;
        assert!(apply_next(&mut runtime, &rx)?);
        let view = runtime.list_view(ScreenKey::EkalArya);
        assert!(!view.is_empty());
        assert!(view.rows.iter().all(|row| row[0].contains(&term)));
        assert_eq!(view.search_query, term);
        Ok(())
    }

    #[test]
    fn width_hint_sizes_pages_unless_configured() -> Result<()> {
        let (tx, rx) = mpsc::channel();

        let mut fixed = demo();
        fixed.set_page_size_hint(15);
        fixed.enter_screen(ScreenKey::EkalArya, &tx)?;
        apply_next(&mut fixed, &rx)?;
        assert_eq!(fixed.list_view(ScreenKey::EkalArya).len(), PAGE_SIZE);

        let mut adaptive = ListRuntime::demo(DEMO_SEED, Duration::ZERO, None, WINDOW);
        adaptive.set_page_size_hint(15);
        adaptive.enter_screen(ScreenKey::EkalArya, &tx)?;
        apply_next(&mut adaptive, &rx)?;
        assert_eq!(adaptive.list_view(ScreenKey::EkalArya).len(), 15);

        adaptive.leave_screen(ScreenKey::EkalArya);
        adaptive.set_page_size_hint(35);
        adaptive.enter_screen(ScreenKey::EkalArya, &tx)?;
        assert!(adaptive.load_next_page(ScreenKey::EkalArya, &tx)?);
        apply_next(&mut adaptive, &rx)?;
        assert_eq!(adaptive.list_view(ScreenKey::EkalArya).len(), 50);
        Ok(())
    }

    #[test]
    fn demo_mode_refuses_deletes() {
        let mut runtime = demo();
        let (tx, _rx) = mpsc::channel();
        let error = runtime
            .delete_row(ScreenKey::EkalArya, "member-0001", &tx)
            .expect_err("demo delete should fail");
        assert!(error.to_string().contains("demo mode"));
    }

    #[test]
    fn remote_first_page_is_loaded_inline() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());
        let handle = thread::spawn(move || {
            let mut request = server.recv().expect("request expected");
            let mut body = String::new();
            request
                .as_reader()
                .read_to_string(&mut body)
                .expect("request body should read");
            let response = Response::from_string(
                r#"{"data":{"familyCollection":{"edges":[{"node":{"id":"f-1","name":"शर्मा परिवार","photos":[],"address":null,"aryaSamaj":null}}],"pageInfo":{"hasNextPage":false,"endCursor":null}}}}"#,
            )
            .with_header(
                Header::from_bytes("Content-Type", "application/json")
                    .expect("valid content type header"),
            );
            request.respond(response).expect("response should succeed");
            body
        });

        let client = Client::new(&addr, "anon-key", Duration::from_secs(2))?;
        let mut runtime = ListRuntime::remote(client, Some(PAGE_SIZE), WINDOW);
        let view = runtime.load_first_page(ScreenKey::AryaPariwar)?;
        assert_eq!(view.rows, vec![vec!["शर्मा परिवार".to_owned(), String::new(), String::new()]]);
        assert_eq!(
            view.footer_text(ScreenKey::AryaPariwar).as_deref(),
            Some("सभी आर्य परिवार दिखाए गए(१)")
        );

        let body = handle.join().expect("server thread should join");
        assert!(body.contains("familyCollection"));
        Ok(())
    }
}
