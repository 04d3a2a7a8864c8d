use crate::{
	application::{AppContext, AppDescriptor, AppId, AppState, Application, Request},
	error::{Result, ShellError},
	services::Services,
};
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Requests made while applying requests are applied too, up to this many rounds.
const MAX_REQUEST_PASSES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
	Switched { from: Option<AppId>, to: AppId },
	/// The requested app was already active; nothing happened.
	AlreadyActive,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppStatus {
	pub id: AppId,
	pub name: String,
	pub state: AppState,
}

#[derive(Debug, Clone, Serialize)]
pub struct LifecycleSnapshot {
	pub active: Option<AppId>,
	pub home: Option<AppId>,
	pub apps: Vec<AppStatus>,
}

#[derive(Debug, Clone, Copy)]
enum Callback {
	Create,
	Open,
	Running,
	Close,
}

struct Entry {
	state: AppState,
	ability: Box<dyn Application>,
}

/// Owns every installed application and keeps exactly one of them active.
pub struct LifecycleManager {
	services: Services,
	descriptors: Vec<AppDescriptor>,
	entries: FxHashMap<AppId, Entry>,
	next_id: u32,
	active: Option<AppId>,
	home: Option<AppId>,
	requests: Vec<Request>,
}
impl LifecycleManager {
	pub fn new(services: Services) -> Self {
		LifecycleManager {
			services,
			descriptors: Vec::new(),
			entries: FxHashMap::default(),
			next_id: 0,
			active: None,
			home: None,
			requests: Vec::new(),
		}
	}

	pub fn install(&mut self, app: Box<dyn Application>) -> Result<AppId> {
		self.install_inner(app, false)
	}

	/// Installs the app every other app falls back to when it closes itself.
	pub fn install_home(&mut self, app: Box<dyn Application>) -> Result<AppId> {
		self.install_inner(app, true)
	}

	fn install_inner(&mut self, app: Box<dyn Application>, home: bool) -> Result<AppId> {
		let id = AppId(self.next_id);
		self.next_id += 1;

		let descriptor = AppDescriptor::new(id, app.info());
		info!(app = descriptor.name(), %id, home, "installing");
		self.descriptors.push(descriptor);
		self.entries.insert(
			id,
			Entry {
				state: AppState::Created,
				ability: app,
			},
		);
		if home {
			self.home = Some(id);
		}

		self.dispatch(id, Callback::Create)?;
		self.apply_requests()?;
		Ok(id)
	}

	/// Makes `id` the active app, closing whichever app was active before.
	pub fn switch_to(&mut self, id: AppId) -> Result<Switch> {
		let switch = self.transition(id)?;
		self.apply_requests()?;
		Ok(switch)
	}

	/// Closes `id` if it is active and hands the screen back to the home app.
	pub fn close(&mut self, id: AppId) -> Result<()> {
		self.close_inner(id)?;
		self.apply_requests()
	}

	/// One scheduler tick: runs the active app's running callback, if any.
	pub fn update(&mut self) -> Result<()> {
		let Some(id) = self.active else {
			return Ok(());
		};
		if self.state(id) != Some(AppState::Running) {
			return Ok(());
		}
		self.dispatch(id, Callback::Running)?;
		self.apply_requests()
	}

	pub fn active_id(&self) -> Option<AppId> {
		self.active
	}
	pub fn home_id(&self) -> Option<AppId> {
		self.home
	}
	pub fn state(&self, id: AppId) -> Option<AppState> {
		self.entries.get(&id).map(|e| e.state)
	}
	pub fn descriptors(&self) -> &[AppDescriptor] {
		&self.descriptors
	}
	pub fn descriptor(&self, id: AppId) -> Option<&AppDescriptor> {
		self.descriptors.iter().find(|d| d.id() == id)
	}

	pub fn snapshot(&self) -> LifecycleSnapshot {
		LifecycleSnapshot {
			active: self.active,
			home: self.home,
			apps: self
				.descriptors
				.iter()
				.filter_map(|d| {
					Some(AppStatus {
						id: d.id(),
						name: d.name().to_string(),
						state: self.state(d.id())?,
					})
				})
				.collect(),
		}
	}

	fn name(&self, id: AppId) -> &str {
		self.descriptor(id).map(|d| d.name()).unwrap_or_default()
	}

	fn set_state(&mut self, id: AppId, state: AppState) {
		if let Some(entry) = self.entries.get_mut(&id) {
			entry.state = state;
		}
	}

	fn transition(&mut self, id: AppId) -> Result<Switch> {
		if !self.entries.contains_key(&id) {
			warn!(%id, "switch to unknown app ignored");
			return Err(ShellError::UnknownApp { id });
		}
		if self.active == Some(id) {
			warn!(app = self.name(id), %id, "switch to the active app ignored");
			return Ok(Switch::AlreadyActive);
		}

		let from = self.active.take();
		if let Some(previous) = from {
			info!(app = self.name(previous), id = %previous, "closing");
			self.set_state(previous, AppState::Closed);
			self.dispatch(previous, Callback::Close)?;
		}

		info!(app = self.name(id), %id, "opening");
		self.set_state(id, AppState::Opened);
		self.active = Some(id);
		self.dispatch(id, Callback::Open)?;
		self.set_state(id, AppState::Running);

		Ok(Switch::Switched { from, to: id })
	}

	fn close_inner(&mut self, id: AppId) -> Result<()> {
		let Some(state) = self.state(id) else {
			warn!(%id, "close of unknown app ignored");
			return Err(ShellError::UnknownApp { id });
		};
		if !state.is_active() {
			debug!(app = self.name(id), %id, ?state, "close of inactive app ignored");
			return Ok(());
		}

		info!(app = self.name(id), %id, "closing");
		self.set_state(id, AppState::Closed);
		self.active = None;
		self.dispatch(id, Callback::Close)?;

		match self.home {
			Some(home) if home != id => self.transition(home).map(|_| ()),
			_ => Ok(()),
		}
	}

	fn apply_requests(&mut self) -> Result<()> {
		for _ in 0..MAX_REQUEST_PASSES {
			if self.requests.is_empty() {
				return Ok(());
			}
			for request in std::mem::take(&mut self.requests) {
				let result = match request {
					Request::Open(id) => self.transition(id).map(|_| ()),
					Request::Close(id) => self.close_inner(id),
				};
				match result {
					Err(e) if e.is_fatal() => return Err(e),
					Err(e) => debug!(?request, %e, "request dropped"),
					Ok(()) => {}
				}
			}
		}
		if !self.requests.is_empty() {
			warn!(
				pending = self.requests.len(),
				active = ?self.active,
				"apps keep requesting each other, dropping the remaining requests"
			);
			self.requests.clear();
		}
		Ok(())
	}

	fn dispatch(&mut self, id: AppId, callback: Callback) -> Result<()> {
		let Some(entry) = self.entries.get_mut(&id) else {
			return Err(ShellError::UnknownApp { id });
		};
		let mut ctx = AppContext::new(id, &self.descriptors, &self.services, &mut self.requests);
		let ability = entry.ability.as_mut();
		match callback {
			Callback::Create => ability.on_create(&mut ctx),
			Callback::Open => ability.on_open(&mut ctx),
			Callback::Running => ability.on_running(&mut ctx),
			Callback::Close => ability.on_close(&mut ctx),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{application::AppInfo, services::testing::services};
	use parking_lot::Mutex;
	use proptest::prelude::*;
	use std::sync::Arc;

	type Journal = Arc<Mutex<Vec<(String, &'static str)>>>;

	/// Records each callback and optionally reacts to it.
	struct Probe {
		name: String,
		journal: Journal,
		open_self_on_create: bool,
		close_after_ticks: Option<u32>,
		ticks: u32,
	}
	impl Probe {
		fn new(name: &str, journal: &Journal) -> Self {
			Probe {
				name: name.to_string(),
				journal: journal.clone(),
				open_self_on_create: false,
				close_after_ticks: None,
				ticks: 0,
			}
		}
		fn log(&self, event: &'static str) {
			self.journal.lock().push((self.name.clone(), event));
		}
	}
	impl Application for Probe {
		fn info(&self) -> AppInfo {
			AppInfo::new(self.name.clone())
		}
		fn on_create(&mut self, ctx: &mut AppContext) -> Result<()> {
			self.log("create");
			if self.open_self_on_create {
				ctx.open_app(ctx.id());
			}
			Ok(())
		}
		fn on_open(&mut self, _ctx: &mut AppContext) -> Result<()> {
			self.log("open");
			Ok(())
		}
		fn on_running(&mut self, ctx: &mut AppContext) -> Result<()> {
			self.log("running");
			self.ticks += 1;
			if self.close_after_ticks == Some(self.ticks) {
				ctx.close();
			}
			Ok(())
		}
		fn on_close(&mut self, _ctx: &mut AppContext) -> Result<()> {
			self.log("close");
			Ok(())
		}
	}

	fn events(journal: &Journal) -> Vec<(String, &'static str)> {
		std::mem::take(&mut *journal.lock())
	}
	fn ev(name: &str, event: &'static str) -> (String, &'static str) {
		(name.to_string(), event)
	}

	/// home + two plain apps
	fn manager(journal: &Journal) -> (LifecycleManager, AppId, AppId, AppId) {
		let mut manager = LifecycleManager::new(services());
		let mut home = Probe::new("home", journal);
		home.open_self_on_create = true;
		let home = manager.install_home(Box::new(home)).unwrap();
		let a = manager.install(Box::new(Probe::new("a", journal))).unwrap();
		let b = manager.install(Box::new(Probe::new("b", journal))).unwrap();
		(manager, home, a, b)
	}

	fn active_count(manager: &LifecycleManager) -> usize {
		manager
			.descriptors()
			.iter()
			.filter(|d| manager.state(d.id()).is_some_and(AppState::is_active))
			.count()
	}

	#[test]
	fn ids_are_sequential_and_created_once() {
		let journal = Journal::default();
		let (manager, home, a, b) = manager(&journal);
		assert_eq!((home, a, b), (AppId(0), AppId(1), AppId(2)));
		assert_eq!(
			events(&journal),
			vec![
				ev("home", "create"),
				ev("home", "open"),
				ev("a", "create"),
				ev("b", "create"),
			]
		);
		assert_eq!(manager.state(a), Some(AppState::Created));
		assert_eq!(manager.active_id(), Some(home));
		assert_eq!(manager.state(home), Some(AppState::Running));
	}

	#[test]
	fn switch_closes_the_previous_app_first() {
		let journal = Journal::default();
		let (mut manager, home, a, _) = manager(&journal);
		events(&journal);

		assert_eq!(
			manager.switch_to(a).unwrap(),
			Switch::Switched {
				from: Some(home),
				to: a
			}
		);
		assert_eq!(
			events(&journal),
			vec![ev("home", "close"), ev("a", "open")]
		);
		assert_eq!(manager.state(home), Some(AppState::Closed));
		assert_eq!(manager.state(a), Some(AppState::Running));
		assert_eq!(manager.active_id(), Some(a));
	}

	#[test]
	fn switching_to_the_active_app_is_a_noop() {
		let journal = Journal::default();
		let (mut manager, home, _, _) = manager(&journal);
		events(&journal);
		assert_eq!(manager.switch_to(home).unwrap(), Switch::AlreadyActive);
		assert!(events(&journal).is_empty());
		assert_eq!(manager.state(home), Some(AppState::Running));
	}

	#[test]
	fn unknown_app_leaves_everything_alone() {
		let journal = Journal::default();
		let (mut manager, home, _, _) = manager(&journal);
		events(&journal);
		assert_eq!(
			manager.switch_to(AppId(42)),
			Err(ShellError::UnknownApp { id: AppId(42) })
		);
		assert_eq!(manager.active_id(), Some(home));
		assert_eq!(manager.state(home), Some(AppState::Running));
		assert!(events(&journal).is_empty());
	}

	#[test]
	fn update_only_runs_the_active_app() {
		let journal = Journal::default();
		let (mut manager, _, a, _) = manager(&journal);
		manager.switch_to(a).unwrap();
		events(&journal);
		manager.update().unwrap();
		manager.update().unwrap();
		assert_eq!(
			events(&journal),
			vec![ev("a", "running"), ev("a", "running")]
		);
	}

	#[test]
	fn update_without_an_active_app_does_nothing() {
		let journal = Journal::default();
		let mut manager = LifecycleManager::new(services());
		manager
			.install(Box::new(Probe::new("idle", &journal)))
			.unwrap();
		events(&journal);
		manager.update().unwrap();
		assert_eq!(manager.active_id(), None);
		assert!(events(&journal).is_empty());
	}

	#[test]
	fn closing_itself_returns_to_home() {
		let journal = Journal::default();
		let mut manager = LifecycleManager::new(services());
		let mut home = Probe::new("home", &journal);
		home.open_self_on_create = true;
		let home = manager.install_home(Box::new(home)).unwrap();
		let mut quitter = Probe::new("quitter", &journal);
		quitter.close_after_ticks = Some(2);
		let quitter = manager.install(Box::new(quitter)).unwrap();

		manager.switch_to(quitter).unwrap();
		events(&journal);
		manager.update().unwrap();
		assert_eq!(manager.active_id(), Some(quitter));
		manager.update().unwrap();

		assert_eq!(manager.active_id(), Some(home));
		assert_eq!(manager.state(quitter), Some(AppState::Closed));
		assert_eq!(manager.state(home), Some(AppState::Running));
		assert_eq!(
			events(&journal),
			vec![
				ev("quitter", "running"),
				ev("quitter", "running"),
				ev("quitter", "close"),
				ev("home", "open"),
			]
		);
	}

	#[test]
	fn reopening_cycles_through_opened_again() {
		let journal = Journal::default();
		let (mut manager, home, a, _) = manager(&journal);
		manager.switch_to(a).unwrap();
		manager.close(a).unwrap();
		manager.switch_to(a).unwrap();
		manager.switch_to(home).unwrap();
		let trail: Vec<_> = events(&journal)
			.into_iter()
			.filter(|(name, _)| name == "a")
			.map(|(_, event)| event)
			.collect();
		assert_eq!(trail, vec!["create", "open", "close", "open", "close"]);
	}

	#[test]
	fn snapshot_lists_every_app() {
		let journal = Journal::default();
		let (manager, home, _, _) = manager(&journal);
		let snapshot = manager.snapshot();
		assert_eq!(snapshot.active, Some(home));
		assert_eq!(snapshot.home, Some(home));
		let names: Vec<_> = snapshot.apps.iter().map(|a| a.name.as_str()).collect();
		assert_eq!(names, ["home", "a", "b"]);
	}

	/// Opens `other` as soon as it is opened itself.
	struct Bouncer {
		other: AppId,
		opens: Arc<Mutex<u32>>,
	}
	impl Application for Bouncer {
		fn info(&self) -> AppInfo {
			AppInfo::new("bouncer")
		}
		fn on_open(&mut self, ctx: &mut AppContext) -> Result<()> {
			*self.opens.lock() += 1;
			ctx.open_app(self.other);
			Ok(())
		}
	}

	#[test]
	fn apps_opening_each_other_do_not_hang_the_loop() {
		let opens = Arc::new(Mutex::new(0));
		let mut manager = LifecycleManager::new(services());
		let ping = manager
			.install(Box::new(Bouncer {
				other: AppId(1),
				opens: opens.clone(),
			}))
			.unwrap();
		let pong = manager
			.install(Box::new(Bouncer {
				other: AppId(0),
				opens: opens.clone(),
			}))
			.unwrap();

		assert!(matches!(manager.switch_to(ping).unwrap(), Switch::Switched { .. }));
		assert_eq!(*opens.lock() as usize, MAX_REQUEST_PASSES + 1);
		assert_eq!(active_count(&manager), 1);
		assert!([Some(ping), Some(pong)].contains(&manager.active_id()));

		// the queue was dropped, so the next tick starts clean
		manager.update().unwrap();
		assert_eq!(*opens.lock() as usize, MAX_REQUEST_PASSES + 1);
	}

	#[derive(Debug, Clone)]
	enum Op {
		Switch(u32),
		Close(u32),
		Tick,
	}

	fn op() -> impl Strategy<Value = Op> {
		prop_oneof![
			(0u32..5).prop_map(Op::Switch),
			(0u32..5).prop_map(Op::Close),
			Just(Op::Tick),
		]
	}

	proptest! {
		#[test]
		fn at_most_one_app_is_ever_active(ops in proptest::collection::vec(op(), 0..64)) {
			let journal = Journal::default();
			let (mut manager, _, _, _) = manager(&journal);
			for op in ops {
				let _ = match op {
					Op::Switch(id) => manager.switch_to(AppId(id)).map(|_| ()),
					Op::Close(id) => manager.close(AppId(id)),
					Op::Tick => manager.update(),
				};
				prop_assert!(active_count(&manager) <= 1);
				if let Some(active) = manager.active_id() {
					prop_assert!(manager.state(active).is_some_and(AppState::is_active));
				} else {
					prop_assert_eq!(active_count(&manager), 0);
				}
			}
		}
	}
}
