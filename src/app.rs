use anyhow::Result;
use ratatui::widgets::ListState;
use uuid::Uuid;

use crate::client::YorimichiClient;
use crate::config::Config;
use crate::trip::{ChatResponse, Location, RouteAlternative, Station, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Start,
    Route,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Bot,
}

/// Suggested prompts shown before the first results arrive.
pub const START_TEMPLATES: &[&str] = &[
    "Find me Dango makers with EC site",
    "I want to experience making Washi paper and have the opportunity",
    "I want to experience traditional craftsmanship and explore handmade products unique to the Amami area.",
];
pub const ROUTE_TEMPLATES: &[&str] =
    &["Create a fun route for me that includes other enjoyable activities in the same neighborhood."];
pub const BACK_TEMPLATES: &[&str] = &["I want to go back to the previous page"];

/// The single in-flight request. `text` is kept for the rollback path.
pub struct PendingRequest {
    pub text: String,
    pub task: tokio::task::JoinHandle<Result<ChatResponse>>,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub mode: Mode,
    pub input_mode: InputMode,

    // Chat transcript and input
    pub messages: Vec<ChatMessage>,
    pub chat_input: String,
    pub chat_cursor: usize, // cursor position in chat_input, in chars
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Request orchestration. At most one request is in flight; the
    // session thread id is generated once and never regenerated.
    pub pending: Option<PendingRequest>,
    pub thread_id: String,
    pub status: Option<String>,

    // Snapshot slices from the last responses that carried them
    pub stores: Vec<Store>,
    pub locations: Vec<Location>,
    pub station: Option<Station>,
    pub waypoints: Vec<String>,
    pub routes: Vec<RouteAlternative>,

    // View state
    pub template_state: ListState,
    pub route_state: ListState,
    pub store_scroll: u16,
    pub itinerary_scroll: u16,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub client: YorimichiClient,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let client = YorimichiClient::new(
            &config.resolve_api_url(),
            std::time::Duration::from_secs(config.resolve_timeout_secs()),
        )?;

        let mut template_state = ListState::default();
        template_state.select(Some(0));

        Ok(Self {
            should_quit: false,
            mode: Mode::Start,
            input_mode: InputMode::Normal,

            messages: Vec::new(),
            chat_input: String::new(),
            chat_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            pending: None,
            thread_id: Uuid::new_v4().to_string(),
            status: None,

            stores: Vec::new(),
            locations: Vec::new(),
            station: None,
            waypoints: Vec::new(),
            routes: Vec::new(),

            template_state,
            route_state: ListState::default(),
            store_scroll: 0,
            itinerary_scroll: 0,
            animation_frame: 0,

            client,
        })
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Send one message to the backend. Ignored while a request is
    /// already in flight or when the text is blank.
    pub fn send_message(&mut self, text: String) {
        if self.pending.is_some() || text.trim().is_empty() {
            return;
        }

        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: text.clone(),
        });
        self.chat_input.clear();
        self.chat_cursor = 0;
        self.status = None;
        self.scroll_chat_to_bottom();

        let client = self.client.clone();
        let thread_id = self.thread_id.clone();
        let prompt = text.clone();
        let task = tokio::spawn(async move { client.generate_response(&prompt, &thread_id).await });

        self.pending = Some(PendingRequest { text, task });
    }

    /// Called from the event loop once the spawned request has finished.
    pub async fn poll_pending(&mut self) {
        let finished = self.pending.as_ref().is_some_and(|p| p.task.is_finished());
        if !finished {
            return;
        }

        if let Some(pending) = self.pending.take() {
            let result = match pending.task.await {
                Ok(result) => result,
                Err(err) => Err(anyhow::anyhow!("request task failed: {err}")),
            };
            self.finish_request(pending.text, result);
        }
    }

    /// Settle one request: apply the response snapshot, or roll the
    /// optimistic user entry back so the text can be resent.
    pub fn finish_request(&mut self, sent_text: String, result: Result<ChatResponse>) {
        self.pending = None;
        match result {
            Ok(response) => self.apply_response(response),
            Err(err) => self.roll_back(sent_text, err.to_string()),
        }
    }

    /// Each optional field present is the authoritative new value of its
    /// slice; absent fields leave the prior value untouched.
    fn apply_response(&mut self, response: ChatResponse) {
        if let Some(message) = response.response_message {
            self.messages.push(ChatMessage {
                role: ChatRole::Bot,
                content: message,
            });
        }
        if let Some(locations) = response.location_names {
            self.locations = locations;
        }
        if let Some(stores) = response.stores {
            self.stores = stores.into_iter().map(Store::from).collect();
            self.store_scroll = 0;
        }
        if let Some(route) = response.route {
            self.routes = route.routes;
            self.route_state
                .select(if self.routes.is_empty() { None } else { Some(0) });
        }
        if let Some(station) = response.station {
            self.station = Some(station);
        }
        if let Some(waypoints) = response.waypoints {
            self.waypoints = waypoints;
            self.itinerary_scroll = 0;
        }

        self.template_state.select(Some(0));
        self.scroll_chat_to_bottom();
    }

    fn roll_back(&mut self, sent_text: String, error: String) {
        // The most recent entry is the optimistic user message
        self.messages.pop();
        self.chat_cursor = sent_text.chars().count();
        self.chat_input = sent_text;
        self.status = Some(format!("Request failed: {error}"));
    }

    // Mode transitions are user-driven only; responses never change the
    // mode on their own.
    pub fn enter_route_view(&mut self) {
        if !self.routes.is_empty() {
            self.mode = Mode::Route;
            self.template_state.select(Some(0));
        }
    }

    pub fn leave_route_view(&mut self) {
        self.mode = Mode::Start;
        self.template_state.select(Some(0));
    }

    /// Suggested prompts for the current state, matching the chat page:
    /// starter prompts until results exist, then the route prompt, and
    /// the way back out of the route view.
    pub fn templates(&self) -> &'static [&'static str] {
        if self.routes.is_empty() && self.stores.is_empty() {
            START_TEMPLATES
        } else if !self.routes.is_empty() && self.mode == Mode::Start {
            ROUTE_TEMPLATES
        } else if !self.routes.is_empty() && self.mode == Mode::Route {
            BACK_TEMPLATES
        } else {
            &[]
        }
    }

    pub fn activate_selected_template(&mut self) {
        let templates = self.templates();
        let Some(index) = self.template_state.selected() else {
            return;
        };
        let Some(&template) = templates.get(index) else {
            return;
        };

        // Once a route exists the visible prompts toggle the view
        // instead of sending; the starter prompts send themselves.
        match self.mode {
            Mode::Route => self.leave_route_view(),
            Mode::Start if !self.routes.is_empty() => self.enter_route_view(),
            Mode::Start => self.send_message(template.to_string()),
        }
    }

    pub fn template_nav_down(&mut self) {
        let len = self.templates().len();
        if len > 0 {
            let i = self.template_state.selected().unwrap_or(0);
            self.template_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn template_nav_up(&mut self) {
        let i = self.template_state.selected().unwrap_or(0);
        self.template_state.select(Some(i.saturating_sub(1)));
    }

    // Route alternative selection (the itinerary view highlights the
    // selected alternative)
    pub fn route_nav_down(&mut self) {
        let len = self.routes.len();
        if len > 0 {
            let i = self.route_state.selected().unwrap_or(0);
            self.route_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn route_nav_up(&mut self) {
        let i = self.route_state.selected().unwrap_or(0);
        self.route_state.select(Some(i.saturating_sub(1)));
    }

    pub fn selected_route(&self) -> Option<&RouteAlternative> {
        self.route_state.selected().and_then(|i| self.routes.get(i))
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Scroll chat so the latest entry (or the loading indicator) is
    /// visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for msg in &self.messages {
            total_lines += 1; // Role line
            for line in msg.content.lines() {
                // Character count, not byte length, for UTF-8 text
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        // Room for the loading indicator
        total_lines += 2;

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }

    pub fn scroll_chat_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::{LatLng, RouteSet, StoreRecord};

    fn test_app() -> App {
        let mut config = Config::new();
        // Port 1 is never listening, so no test can reach a live backend
        config.api_url = Some("http://127.0.0.1:1".to_string());
        config.timeout_secs = Some(5);
        App::new(config).unwrap()
    }

    fn store_record(name: &str) -> StoreRecord {
        StoreRecord {
            name: name.to_string(),
            rating: 4.5,
            address: "Osaka".to_string(),
            website: "https://a.example".to_string(),
            photo: "https://a.example/p.jpg".to_string(),
        }
    }

    fn station(name: &str) -> Station {
        Station {
            name: name.to_string(),
            location: LatLng { lat: 34.66, lng: 135.5 },
        }
    }

    fn route_set(count: usize) -> RouteSet {
        RouteSet {
            routes: (0..count)
                .map(|i| RouteAlternative {
                    summary: format!("R{i}"),
                    legs: Vec::new(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn successful_send_appends_user_then_bot() {
        let mut app = test_app();
        app.chat_input = "Find ramen shops".to_string();
        app.send_message(app.chat_input.clone());

        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].role, ChatRole::User);
        assert_eq!(app.messages[0].content, "Find ramen shops");
        assert!(app.chat_input.is_empty());
        assert!(app.is_loading());

        let pending = app.pending.take().unwrap();
        pending.task.abort();
        let response = ChatResponse {
            response_message: Some("Here are some options".to_string()),
            stores: Some(vec![store_record("Ramen A")]),
            ..Default::default()
        };
        app.finish_request(pending.text, Ok(response));

        assert!(!app.is_loading());
        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.messages[1].role, ChatRole::Bot);
        assert_eq!(app.messages[1].content, "Here are some options");
        assert_eq!(app.stores.len(), 1);
        assert_eq!(app.stores[0].name, "Ramen A");
    }

    #[tokio::test]
    async fn failed_send_is_a_transcript_no_op_and_restores_input() {
        let mut app = test_app();
        app.send_message("Find ramen shops".to_string());
        let pending = app.pending.take().unwrap();
        pending.task.abort();

        app.finish_request(pending.text, Err(anyhow::anyhow!("HTTP 500")));

        assert!(app.messages.is_empty());
        assert_eq!(app.chat_input, "Find ramen shops");
        assert_eq!(app.chat_cursor, "Find ramen shops".chars().count());
        assert!(app.status.as_deref().unwrap().contains("HTTP 500"));
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn second_send_while_in_flight_is_ignored() {
        let mut app = test_app();
        app.send_message("first".to_string());
        app.send_message("second".to_string());

        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].content, "first");

        if let Some(pending) = app.pending.take() {
            pending.task.abort();
        }
    }

    #[tokio::test]
    async fn blank_text_is_not_sent() {
        let mut app = test_app();
        app.send_message(String::new());
        app.send_message("   ".to_string());
        assert!(app.messages.is_empty());
        assert!(app.pending.is_none());
    }

    #[test]
    fn store_snapshot_is_replaced_not_merged() {
        let mut app = test_app();
        app.finish_request(
            "a".to_string(),
            Ok(ChatResponse {
                stores: Some(vec![store_record("Ramen A"), store_record("Ramen B")]),
                ..Default::default()
            }),
        );
        app.finish_request(
            "b".to_string(),
            Ok(ChatResponse {
                stores: Some(vec![store_record("Udon C")]),
                ..Default::default()
            }),
        );

        assert_eq!(app.stores.len(), 1);
        assert_eq!(app.stores[0].name, "Udon C");
    }

    #[test]
    fn absent_fields_retain_prior_state() {
        let mut app = test_app();
        app.finish_request(
            "a".to_string(),
            Ok(ChatResponse {
                station: Some(station("Namba Station")),
                stores: Some(vec![store_record("Ramen A")]),
                ..Default::default()
            }),
        );
        app.finish_request(
            "b".to_string(),
            Ok(ChatResponse {
                response_message: Some("Anything else?".to_string()),
                ..Default::default()
            }),
        );

        assert_eq!(app.station.as_ref().unwrap().name, "Namba Station");
        assert_eq!(app.stores.len(), 1);
    }

    #[test]
    fn mode_changes_only_by_user_action() {
        let mut app = test_app();

        // No route yet: the route view is unreachable
        app.enter_route_view();
        assert_eq!(app.mode, Mode::Start);

        app.finish_request(
            "a".to_string(),
            Ok(ChatResponse {
                route: Some(route_set(2)),
                ..Default::default()
            }),
        );
        assert_eq!(app.mode, Mode::Start);

        app.enter_route_view();
        assert_eq!(app.mode, Mode::Route);

        // A response arriving mid-route-mode does not force a return
        app.finish_request(
            "b".to_string(),
            Ok(ChatResponse {
                response_message: Some("Updated".to_string()),
                route: Some(route_set(1)),
                ..Default::default()
            }),
        );
        assert_eq!(app.mode, Mode::Route);

        app.leave_route_view();
        assert_eq!(app.mode, Mode::Start);
    }

    #[test]
    fn templates_follow_results_and_mode() {
        let mut app = test_app();
        assert_eq!(app.templates(), START_TEMPLATES);

        app.finish_request(
            "a".to_string(),
            Ok(ChatResponse {
                route: Some(route_set(1)),
                ..Default::default()
            }),
        );
        assert_eq!(app.templates(), ROUTE_TEMPLATES);

        app.enter_route_view();
        assert_eq!(app.templates(), BACK_TEMPLATES);
    }

    #[test]
    fn route_template_toggles_mode_instead_of_sending() {
        let mut app = test_app();
        app.finish_request(
            "a".to_string(),
            Ok(ChatResponse {
                route: Some(route_set(1)),
                ..Default::default()
            }),
        );

        app.activate_selected_template();
        assert_eq!(app.mode, Mode::Route);
        assert!(app.messages.is_empty());

        app.activate_selected_template();
        assert_eq!(app.mode, Mode::Start);
        assert!(app.messages.is_empty());
    }

    #[test]
    fn route_selection_resets_with_new_alternatives() {
        let mut app = test_app();
        app.finish_request(
            "a".to_string(),
            Ok(ChatResponse {
                route: Some(route_set(3)),
                ..Default::default()
            }),
        );

        app.route_nav_down();
        app.route_nav_down();
        assert_eq!(app.selected_route().unwrap().summary, "R2");

        app.finish_request(
            "b".to_string(),
            Ok(ChatResponse {
                route: Some(route_set(2)),
                ..Default::default()
            }),
        );
        assert_eq!(app.selected_route().unwrap().summary, "R0");
    }

    #[test]
    fn thread_id_is_stable_for_the_session() {
        let app = test_app();
        let id = app.thread_id.clone();
        assert!(!id.is_empty());
        assert_eq!(app.thread_id, id);
        // Distinct sessions get distinct ids
        assert_ne!(test_app().thread_id, id);
    }
}
