//! Meeting orchestration: who gets invited, and the sequential dialogue that
//! turns a scheduled meeting into a transcript and an outcome.

use crate::context::DayContext;
use crate::decision::DecisionSource;
use crate::state::GovernmentState;
use civitas_data::{Agent, AgentId, AgentType, Branch, EventType, Meeting, MeetingStatus, MeetingType};
use rand::Rng;
use std::fmt::Write as _;
use tracing::{debug, warn};

/// How a single meeting ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingOutcome {
    Completed { statements: usize },
    Cancelled,
}

fn in_pool(meeting_type: MeetingType, organizer: &Agent, candidate: &Agent) -> bool {
    match meeting_type {
        MeetingType::Cabinet => candidate.position.branch == Branch::Executive,
        MeetingType::Committee => {
            candidate.position.branch == Branch::Legislative
                || candidate.agent_type == AgentType::Committee
        }
        MeetingType::Hearing => matches!(
            candidate.agent_type,
            AgentType::Oversight | AgentType::Legislative
        ),
        MeetingType::JointSession => true,
        MeetingType::Emergency => matches!(
            candidate.agent_type,
            AgentType::Executive | AgentType::Department | AgentType::Agency
        ),
        MeetingType::Bilateral => organizer.is_connected_to(&candidate.id),
    }
}

/// The organizer followed by up to `max_participants - 1` of the most effective
/// agents eligible for `meeting_type`.
#[must_use]
pub fn select_participants(
    agents: &[Agent],
    organizer: &Agent,
    meeting_type: MeetingType,
    max_participants: usize,
) -> Vec<AgentId> {
    let mut pool: Vec<&Agent> = agents
        .iter()
        .filter(|a| a.id != organizer.id && in_pool(meeting_type, organizer, a))
        .collect();
    pool.sort_by(|a, b| b.effectiveness.total_cmp(&a.effectiveness));

    let mut participants = Vec::with_capacity(max_participants.max(1));
    participants.push(organizer.id.clone());
    participants.extend(
        pool.into_iter()
            .take(max_participants.saturating_sub(1))
            .map(|a| a.id.clone()),
    );
    participants
}

/// Statement carried by a speaker's reply: the rest of the `STATEMENT:` line, or the whole reply.
#[must_use]
pub fn extract_statement(reply: &str) -> String {
    reply
        .find("STATEMENT:")
        .map(|pos| {
            let rest = reply[pos + "STATEMENT:".len()..].trim_start();
            rest.lines().next().unwrap_or("").trim().to_string()
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| reply.trim().to_string())
}

#[must_use]
pub fn meeting_prompt(
    meeting: &Meeting,
    participant_names: &[&str],
    speaker: &str,
    exchange: usize,
    total: usize,
    transcript: &[String],
) -> String {
    let mut text = String::with_capacity(1024);
    let _ = writeln!(text, "MEETING: {} ({})", meeting.title, meeting.meeting_type.as_str());
    let _ = writeln!(text, "AGENDA: {}", meeting.agenda);
    let _ = writeln!(text, "PARTICIPANTS: {}", participant_names.join(", "));
    let _ = writeln!(text, "EXCHANGE {}/{}", exchange + 1, total);
    let _ = writeln!(text);
    let _ = writeln!(text, "CONVERSATION SO FAR:");
    if transcript.is_empty() {
        let _ = writeln!(text, "Meeting just started.");
    } else {
        let _ = writeln!(text, "{}", transcript.join("\n"));
    }
    let _ = writeln!(text);
    let _ = writeln!(
        text,
        "You are {}. This is a {} meeting. You must contribute to reaching a decision within {} exchanges remaining.",
        speaker,
        meeting.meeting_type.as_str(),
        total - exchange
    );
    if exchange + 1 == total {
        let _ = writeln!(
            text,
            "THIS IS THE FINAL EXCHANGE - You must propose a concrete decision or conclusion."
        );
    }
    let _ = writeln!(text);
    let _ = writeln!(
        text,
        "Respond with your statement for this meeting. Be concise and constructive. Focus on reaching a decision."
    );
    let _ = writeln!(text);
    let _ = write!(text, "FORMAT: STATEMENT: [your contribution to the discussion]");
    text
}

/// Runs one scheduled meeting to completion or cancellation.
pub async fn conduct_meeting<R: Rng>(
    state: &mut GovernmentState,
    meeting_idx: usize,
    source: Option<&dyn DecisionSource>,
    ctx: &mut DayContext<'_, R>,
) -> MeetingOutcome {
    let Some(meeting) = state.meetings.get(meeting_idx) else {
        return MeetingOutcome::Cancelled;
    };
    let speakers: Vec<usize> = meeting
        .participants
        .iter()
        .filter_map(|id| state.agent_index(id))
        .collect();

    let Some(source) = source else {
        warn!(meeting = %meeting.title, "No decision source; meeting cancelled");
        state.meetings[meeting_idx].status = MeetingStatus::Cancelled;
        return MeetingOutcome::Cancelled;
    };
    if speakers.is_empty() {
        warn!(meeting = %meeting.title, "No participants present; meeting cancelled");
        state.meetings[meeting_idx].status = MeetingStatus::Cancelled;
        return MeetingOutcome::Cancelled;
    }

    state.meetings[meeting_idx].status = MeetingStatus::InProgress;
    let exchanges = ctx.config.meetings.exchanges;
    let bonus = ctx.config.meetings.speaker_bonus;
    let mut transcript: Vec<String> = Vec::with_capacity(exchanges);

    for exchange in 0..exchanges {
        let speaker_idx = speakers[exchange % speakers.len()];
        let reply = {
            let meeting = &state.meetings[meeting_idx];
            let names: Vec<&str> = speakers.iter().map(|&i| state.agents[i].name.as_str()).collect();
            let speaker = &state.agents[speaker_idx];
            let prompt = meeting_prompt(meeting, &names, &speaker.name, exchange, exchanges, &transcript);
            source.decide(speaker, &prompt).await
        };

        match reply {
            Ok(reply) => {
                let speaker = &mut state.agents[speaker_idx];
                transcript.push(format!("{}: {}", speaker.name, extract_statement(&reply)));
                speaker.adjust_effectiveness(bonus);
            }
            Err(e) => {
                warn!(
                    meeting = %state.meetings[meeting_idx].title,
                    exchange = exchange + 1,
                    error = %e,
                    "Meeting exchange failed"
                );
            }
        }
    }

    let statements = transcript.len();
    let meeting = &mut state.meetings[meeting_idx];
    let closing = transcript
        .iter()
        .skip(statements.saturating_sub(2))
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");
    meeting.outcomes = if closing.is_empty() { Vec::new() } else { vec![closing] };
    meeting.transcript = transcript;
    meeting.status = MeetingStatus::Completed;
    debug!(meeting = %meeting.title, statements, "Meeting completed");

    let description = format!("{} completed: {}", meeting.meeting_type.as_str(), meeting.title);
    let involved = meeting.participants.clone();
    ctx.emit(EventType::ProposalSubmitted, description, involved, 0.3, true);
    MeetingOutcome::Completed { statements }
}

/// Conducts every meeting still scheduled, one after another.
pub async fn conduct_scheduled<R: Rng>(
    state: &mut GovernmentState,
    source: Option<&dyn DecisionSource>,
    ctx: &mut DayContext<'_, R>,
) -> Vec<MeetingOutcome> {
    let scheduled: Vec<usize> = state
        .meetings
        .iter()
        .enumerate()
        .filter(|(_, m)| m.status == MeetingStatus::Scheduled)
        .map(|(i, _)| i)
        .collect();

    let mut outcomes = Vec::with_capacity(scheduled.len());
    for idx in scheduled {
        outcomes.push(conduct_meeting(state, idx, source, ctx).await);
    }
    outcomes
}
