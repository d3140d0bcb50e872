//! Assistant chat state, the keyword responder and the voice collaborator seam.

use std::collections::VecDeque;

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};

use crate::content::{CityStats, TaskRecord};
use crate::entity::DRAWERS;

/// Speech in and out, supplied by the host
pub trait VoiceCollaborator {
    fn start_listening(&mut self);
    fn stop_listening(&mut self);
    fn speak(&mut self, text: &str);
    fn stop_speaking(&mut self);
    /// Next recognized utterance, if one is ready
    fn poll_utterance(&mut self) -> Option<String>;
}

/// No audio; records what would have been said. Utterances can be queued by hand.
#[derive(Debug, Default)]
pub struct SilentVoice {
    listening: bool,
    spoken: Vec<String>,
    queued: VecDeque<String>,
}

impl SilentVoice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_utterance(&mut self, text: &str) {
        self.queued.push_back(text.to_string());
    }

    pub fn spoken(&self) -> &[String] {
        &self.spoken
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }
}

impl VoiceCollaborator for SilentVoice {
    fn start_listening(&mut self) {
        self.listening = true;
    }

    fn stop_listening(&mut self) {
        self.listening = false;
    }

    fn speak(&mut self, text: &str) {
        self.spoken.push(text.to_string());
    }

    fn stop_speaking(&mut self) {}

    fn poll_utterance(&mut self) -> Option<String> {
        if !self.listening {
            return None;
        }
        self.queued.pop_front()
    }
}

/// Utterances arrive as text lines over a channel; speech goes to the log
pub struct ConsoleVoice {
    lines: UnboundedReceiver<String>,
    listening: bool,
}

impl ConsoleVoice {
    pub fn channel() -> (UnboundedSender<String>, ConsoleVoice) {
        let (tx, rx) = unbounded();
        (
            tx,
            ConsoleVoice {
                lines: rx,
                listening: false,
            },
        )
    }
}

impl VoiceCollaborator for ConsoleVoice {
    fn start_listening(&mut self) {
        self.listening = true;
        log::info!("listening for console input");
    }

    fn stop_listening(&mut self) {
        self.listening = false;
    }

    fn speak(&mut self, text: &str) {
        log::info!("ARIA: {}", text);
    }

    fn stop_speaking(&mut self) {}

    fn poll_utterance(&mut self) -> Option<String> {
        if !self.listening {
            return None;
        }
        match self.lines.try_next() {
            Ok(Some(line)) => {
                let line = line.trim().to_string();
                (!line.is_empty()).then_some(line)
            }
            _ => None,
        }
    }
}

/// Keyword-driven replies, first match wins
#[derive(Debug, Default, Clone, Copy)]
pub struct Responder;

impl Responder {
    pub fn reply(&self, message: &str, tasks: &[TaskRecord]) -> String {
        let lower = message.to_lowercase();
        let has = |word: &str| lower.contains(word);

        if has("task") {
            let top = tasks
                .first()
                .and_then(|t| t.account_name.as_deref())
                .unwrap_or("undefined");
            format!(
                "You have {} active tasks. The highest priority is \"{}\". I can help you prioritize or create a task schedule.",
                tasks.len(),
                top
            )
        } else if has("portfolio") {
            "Your portfolio is performing well with $2.4M bound YTD and a 58% bound-quote ratio. Would you like me to generate a performance report?".to_string()
        } else if has("risk") {
            "Current risk assessment shows 3 high-priority accounts requiring immediate attention: MUJI Hong Kong, Disney Company, and Knight-Swift. Should I schedule review meetings?".to_string()
        } else if has("meeting") || has("schedule") {
            "I can schedule meetings for you. You have 3 meetings today: 10:30 AM with Knight-Swift, 2:00 PM Disney renewal review, and 3:30 PM MUJI risk assessment.".to_string()
        } else if has("note") || has("reminder") {
            "I've noted that for you. Your current reminders: Complete MUJI review by EOD, Call Disney contact about renewal terms, Update Knight-Swift sanctions check.".to_string()
        } else if has("help") {
            "As your AI assistant and secretary, I can: 1) Manage insurance tasks and policies, 2) Take notes and set reminders, 3) Schedule meetings, 4) Provide risk assessments, 5) Generate reports. What would you like help with?".to_string()
        } else {
            "I'm ARIA, your AI assistant and secretary. I can help with insurance expertise, manage tasks, take notes, schedule meetings, and provide analysis. What do you need?".to_string()
        }
    }
}

/// Chat text for a clicked city
pub fn city_summary(city: &CityStats) -> String {
    let advisory = match city.risk.as_str() {
        "High" => "HIGH RISK: This region requires immediate attention!",
        "Medium" => "MEDIUM RISK: Monitor closely for changes.",
        _ => "LOW RISK: Region performing well.",
    };
    format!(
        "{} Insurance Portfolio:\n\nActive Policies: {}\nTotal Premium: {}\nRisk Level: {}\nRecent Claims: {}\n\n{}",
        city.name, city.policies, city.premium, city.risk, city.claims, advisory
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: String,
    /// Wall-clock time the message was posted, e.g. "02:15 PM"
    pub timestamp: String,
}

impl ChatMessage {
    fn new(speaker: Speaker, text: String) -> Self {
        Self {
            speaker,
            text,
            timestamp: chrono::Local::now().format("%I:%M %p").to_string(),
        }
    }
}

struct PendingReply {
    due: f64,
    text: String,
}

/// Chat panel, listening state and delayed replies
pub struct Assistant {
    voice: Box<dyn VoiceCollaborator>,
    responder: Responder,
    reply_delay: f64,
    panel_open: bool,
    listening: bool,
    voice_input: bool,
    messages: Vec<ChatMessage>,
    pending: VecDeque<PendingReply>,
    tasks: Vec<TaskRecord>,
}

impl Assistant {
    /// `reply_delay` in seconds
    pub fn new(voice: Box<dyn VoiceCollaborator>, reply_delay: f64) -> Self {
        Self {
            voice,
            responder: Responder,
            reply_delay,
            panel_open: false,
            listening: false,
            voice_input: false,
            messages: Vec::new(),
            pending: VecDeque::new(),
            tasks: Vec::new(),
        }
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    /// Avatar should show its listening glow
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_voice_input_active(&self) -> bool {
        self.voice_input
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn pending_replies(&self) -> usize {
        self.pending.len()
    }

    pub fn set_tasks(&mut self, tasks: &[TaskRecord]) {
        self.tasks = tasks.to_vec();
    }

    /// Opening the panel puts the avatar into listening mode
    pub fn toggle_panel(&mut self) -> bool {
        self.panel_open = !self.panel_open;
        if self.panel_open {
            self.listening = true;
        }
        self.panel_open
    }

    pub fn close_panel(&mut self) {
        self.panel_open = false;
    }

    pub fn toggle_voice_input(&mut self) {
        if self.voice_input {
            self.voice.stop_listening();
            self.voice_input = false;
            self.listening = false;
        } else {
            self.voice.start_listening();
            self.voice_input = true;
            self.listening = true;
        }
    }

    pub fn stop_speaking(&mut self) {
        self.voice.stop_speaking();
        self.listening = false;
    }

    pub fn clear_chat(&mut self) {
        self.messages.clear();
    }

    /// Post a user message; the reply lands `reply_delay` seconds later
    pub fn send_message(&mut self, text: &str, now: f64) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.messages.push(ChatMessage::new(Speaker::User, text.to_string()));
        self.pending.push_back(PendingReply {
            due: now + self.reply_delay,
            text: self.responder.reply(text, &self.tasks),
        });
        true
    }

    /// Assistant-side message that also opens the panel
    pub fn post_notice(&mut self, text: String) {
        self.messages.push(ChatMessage::new(Speaker::Assistant, text));
        self.panel_open = true;
    }

    pub fn show_drawer_contents(&mut self, index: usize) {
        if let Some(drawer) = DRAWERS.get(index) {
            self.post_notice(drawer.summary());
        }
    }

    pub fn show_city_details(&mut self, city: &CityStats) {
        self.post_notice(city_summary(city));
    }

    /// Deliver due replies and take recognized speech; returns replies spoken this call
    pub fn update(&mut self, now: f64) -> Vec<String> {
        if self.voice_input {
            if let Some(utterance) = self.voice.poll_utterance() {
                self.send_message(&utterance, now);
                self.voice.stop_listening();
                self.voice_input = false;
                self.listening = false;
            }
        }

        let mut delivered = Vec::new();
        while self.pending.front().is_some_and(|p| p.due <= now) {
            let Some(reply) = self.pending.pop_front() else { break };
            self.voice.speak(&reply.text);
            self.messages.push(ChatMessage::new(Speaker::Assistant, reply.text.clone()));
            delivered.push(reply.text);
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(name: &str) -> TaskRecord {
        TaskRecord {
            account_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_task_reply_counts_tasks() {
        let reply = Responder.reply("Show my TASKS", &[task("MUJI Hong Kong"), task("Disney")]);
        assert_eq!(
            reply,
            "You have 2 active tasks. The highest priority is \"MUJI Hong Kong\". I can help you prioritize or create a task schedule."
        );
    }

    #[test]
    fn test_keyword_precedence() {
        // "task" beats "risk" when both appear
        assert!(Responder.reply("risk task", &[]).starts_with("You have 0 active tasks"));
        assert!(Responder.reply("schedule a meeting", &[]).starts_with("I can schedule meetings"));
        assert!(Responder.reply("add a reminder", &[]).starts_with("I've noted that"));
        assert!(Responder.reply("hello", &[]).starts_with("I'm ARIA"));
    }

    #[test]
    fn test_reply_arrives_after_delay() {
        let mut assistant = Assistant::new(Box::new(SilentVoice::new()), 1.0);
        assert!(assistant.send_message("help", 10.0));
        assert!(assistant.update(10.5).is_empty());
        let replies = assistant.update(11.0);
        assert_eq!(replies.len(), 1);
        assert!(replies[0].starts_with("As your AI assistant"));
        assert_eq!(assistant.messages().len(), 2);
        assert_eq!(assistant.messages()[1].speaker, Speaker::Assistant);
    }

    #[test]
    fn test_blank_message_ignored() {
        let mut assistant = Assistant::new(Box::new(SilentVoice::new()), 1.0);
        assert!(!assistant.send_message("   ", 0.0));
        assert_eq!(assistant.pending_replies(), 0);
    }

    #[test]
    fn test_utterance_becomes_message_and_stops_listening() {
        let mut voice = SilentVoice::new();
        voice.queue_utterance("portfolio status");
        let mut assistant = Assistant::new(Box::new(voice), 0.0);
        assistant.toggle_voice_input();
        assert!(assistant.is_listening());

        let replies = assistant.update(1.0);
        assert!(!assistant.is_voice_input_active());
        assert!(!assistant.is_listening());
        assert_eq!(replies.len(), 1);
        assert!(replies[0].starts_with("Your portfolio is performing well"));
    }

    #[test]
    fn test_city_summary_advisory() {
        let tokyo = &CityStats::defaults()[2];
        let text = city_summary(tokyo);
        assert!(text.starts_with("Tokyo Insurance Portfolio:\n\nActive Policies: 186"));
        assert!(text.ends_with("HIGH RISK: This region requires immediate attention!"));
    }

    #[test]
    fn test_panel_toggle_sets_listening() {
        let mut assistant = Assistant::new(Box::new(SilentVoice::new()), 1.0);
        assert!(assistant.toggle_panel());
        assert!(assistant.is_listening());
        assistant.stop_speaking();
        assert!(!assistant.is_listening());
        assert!(!assistant.toggle_panel());
    }
}
