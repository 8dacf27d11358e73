use crate::models::{ChatMessage, ChatRequest};
use boardpulse_common::{ActivityEvent, BoardSnapshot, Card, ReportType, MAX_SNAPSHOT_ACTIVITIES};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

pub const TEMPERATURE: f32 = 0.7;
pub const CHAT_MAX_TOKENS: usize = 1000;

pub const CHAT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant for Trello users. You provide concise and accurate information.";

/// Completion budget per report type.
pub fn max_tokens(report_type: ReportType) -> usize {
    match report_type {
        ReportType::Weekly => 2048,
        ReportType::Monthly => 4096,
    }
}

/// Build the two-message request used for report generation.
pub fn build_report_request(
    model: &str,
    snapshot: &BoardSnapshot,
    report_type: ReportType,
) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(system_prompt(report_type.as_str())),
            ChatMessage::user(format_snapshot(snapshot)),
        ],
        temperature: Some(TEMPERATURE),
        max_tokens: Some(max_tokens(report_type)),
    }
}

/// Build a free-form chat request.
pub fn build_chat_request(model: &str, text: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::system(CHAT_SYSTEM_PROMPT), ChatMessage::user(text)],
        temperature: Some(TEMPERATURE),
        max_tokens: Some(CHAT_MAX_TOKENS),
    }
}

/// System prompt for `kind` (`weekly`, `monthly`, anything else gets the general template).
pub fn system_prompt(kind: &str) -> String {
    let template = match kind {
        "weekly" => WEEKLY_PROMPT,
        "monthly" => MONTHLY_PROMPT,
        _ => GENERAL_PROMPT,
    };
    format!("{DATA_CONTEXT_PREAMBLE}{template}")
}

/// Render a board snapshot as a Markdown digest for the model.
pub fn format_snapshot(snapshot: &BoardSnapshot) -> String {
    let mut out = String::new();
    let board = &snapshot.board;

    out.push_str(&format!("# Board: {}\n\n", board.name));
    if !board.description.trim().is_empty() {
        out.push_str(&format!("Description: {}\n\n", board.description.trim()));
    }

    let member_names: HashMap<&str, &str> = snapshot
        .members
        .iter()
        .map(|m| (m.id.as_str(), display_name(&m.full_name, &m.username)))
        .collect();

    out.push_str(&format!("## Members ({})\n\n", snapshot.members.len()));
    for member in &snapshot.members {
        if member.username.is_empty() {
            out.push_str(&format!("- {}\n", member.full_name));
        } else {
            out.push_str(&format!("- {} (@{})\n", member.full_name, member.username));
        }
    }
    out.push('\n');

    out.push_str("## Lists and Cards\n\n");
    let mut cards_by_list: HashMap<&str, Vec<&Card>> = HashMap::new();
    for card in &snapshot.cards {
        cards_by_list.entry(card.list_id.as_str()).or_default().push(card);
    }

    let mut lists: Vec<_> = snapshot.lists.iter().collect();
    lists.sort_by(|a, b| a.pos.total_cmp(&b.pos));
    let known_lists: HashSet<&str> = snapshot.lists.iter().map(|l| l.id.as_str()).collect();

    for list in lists {
        if list.closed {
            out.push_str(&format!("### List: {} (archived)\n\n", list.name));
        } else {
            out.push_str(&format!("### List: {}\n\n", list.name));
        }
        match cards_by_list.get(list.id.as_str()) {
            Some(cards) if !cards.is_empty() => {
                for card in cards {
                    write_card(&mut out, card, &member_names);
                }
            }
            _ => out.push_str("No cards in this list.\n\n"),
        }
    }

    let unsorted: Vec<&Card> = snapshot
        .cards
        .iter()
        .filter(|c| !known_lists.contains(c.list_id.as_str()))
        .collect();
    if !unsorted.is_empty() {
        out.push_str("### Unsorted cards\n\n");
        for card in unsorted {
            write_card(&mut out, card, &member_names);
        }
    }

    let shown = snapshot.activities.len().min(MAX_SNAPSHOT_ACTIVITIES);
    out.push_str(&format!("## Recent Activity ({shown} actions)\n\n"));
    if shown == 0 {
        out.push_str("No recent activity found.\n");
    }
    // Snapshot keeps newest first; the digest reads oldest first
    for event in snapshot.activities[..shown].iter().rev() {
        out.push_str(&format!(
            "- {}: {}\n",
            event.date.format("%Y-%m-%d %H:%M:%S"),
            describe_activity(event)
        ));
    }

    out
}

fn display_name<'a>(full_name: &'a str, username: &'a str) -> &'a str {
    if full_name.is_empty() {
        username
    } else {
        full_name
    }
}

fn write_card(out: &mut String, card: &Card, member_names: &HashMap<&str, &str>) {
    if card.closed {
        out.push_str(&format!("#### Card: {} (archived)\n\n", card.name));
    } else {
        out.push_str(&format!("#### Card: {}\n\n", card.name));
    }
    if !card.description.trim().is_empty() {
        out.push_str(&format!("Description: {}\n\n", card.description.trim()));
    }
    if let Some(due) = card.due {
        out.push_str(&format!("Due: {}\n\n", due.format("%Y-%m-%d %H:%M UTC")));
    }
    if !card.labels.is_empty() {
        let labels = card
            .labels
            .iter()
            .map(|l| match (&l.name, &l.color) {
                (name, _) if !name.is_empty() => name.clone(),
                (_, Some(color)) => color.clone(),
                _ => "unnamed".to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("Labels: {labels}\n\n"));
    }
    if !card.member_ids.is_empty() {
        let assigned = card
            .member_ids
            .iter()
            .map(|id| member_names.get(id.as_str()).copied().unwrap_or(id.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("Assigned: {assigned}\n\n"));
    }
}

fn name_of<'a>(data: &'a Value, key: &str) -> &'a str {
    data.get(key)
        .and_then(|v| v.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("")
}

/// One-line description of an activity event.
pub fn describe_activity(event: &ActivityEvent) -> String {
    let actor = event.actor();
    let data = &event.data;
    let card = name_of(data, "card");

    match event.action_type.as_str() {
        "createCard" => format!(
            "{actor} created card '{card}' in list '{}'",
            name_of(data, "list")
        ),
        "updateCard" => {
            if data.get("listBefore").is_some() && data.get("listAfter").is_some() {
                format!(
                    "{actor} moved card '{card}' from '{}' to '{}'",
                    name_of(data, "listBefore"),
                    name_of(data, "listAfter")
                )
            } else {
                format!("{actor} updated card '{card}'")
            }
        }
        "commentCard" => {
            let text = data.get("text").and_then(Value::as_str).unwrap_or("");
            format!("{actor} commented on '{card}': '{text}'")
        }
        "addMemberToCard" => format!("{actor} added {} to card '{card}'", member_of(data)),
        "removeMemberFromCard" => {
            format!("{actor} removed {} from card '{card}'", member_of(data))
        }
        "addMemberToBoard" => format!("{actor} added {} to the board", member_of(data)),
        "removeMemberFromBoard" => format!("{actor} removed {} from the board", member_of(data)),
        other => format!("{actor} performed action '{other}'"),
    }
}

fn member_of(data: &Value) -> &str {
    match name_of(data, "member") {
        "" => "a member",
        name => name,
    }
}

const DATA_CONTEXT_PREAMBLE: &str = "You will receive a structured summary of a Trello board: card names, descriptions, lists (statuses), assignees, due dates, labels, comments and recent activity. Base your analysis strictly on this data.\n\n";

const WEEKLY_PROMPT: &str = r#"You are an expert project management assistant. Analyze the board data and write a concise, professional weekly status report for stakeholders and team members.

Use Markdown and these sections:

1. `## Executive Summary`: two or three sentences on overall progress and any critical alerts this week.
2. `## Progress This Week`: tasks completed (moved to a final list), tasks that advanced significantly, newly critical tasks.
3. `## Current Project Status`: work in progress; blocked or stalled tasks with the blocker if stated; work expected to start in the next 7 days.
4. `## Priorities & Deadlines for Next Week`: key tasks and milestones due next week, with suggested priorities based on due dates, labels or descriptions.
5. `## Risks, Blockers & Issues`: critical blockers and new risks surfaced this week.
6. `## Team Focus & Contributions` (optional): areas of team activity and deliverables, without performance judgments.
7. `## Data Limitations` (if applicable): missing information that limits the report.

Rules:
* Be data-driven. Do not invent details or make assumptions beyond the data.
* Keep a formal, objective tone.
* Be thorough but concise.
* Use headings, bullet points and bold text for readability.
"#;

const MONTHLY_PROMPT: &str = r#"You are a strategic project management analyst. Analyze the board data covering the last month and write a comprehensive monthly report for senior management.

Use Markdown and these sections:

1. `## Executive Summary`: the month's performance, key achievements, overall health and critical concerns.
2. `## Overall Project Health & Status`: a qualitative assessment (On Track, Minor Deviations, At Risk) and the state of major initiatives.
3. `## Major Achievements & Milestones Reached`
4. `## Key Performance Indicators & Metrics Overview`: tasks planned vs. completed, throughput, cycle times where the activity log allows; describe progress qualitatively when metrics cannot be derived.
5. `## Trends and Patterns Observed This Month`: completion trends, recurring blockers, shifts in workload.
6. `## Resource Overview & Team Contributions`: workload distribution and collective achievements, without individual performance evaluations.
7. `## Significant Risks, Issues & Mitigation`: risks that arose or persisted, mitigations mentioned in the data, unresolved critical issues.
8. `## Recommendations for Upcoming Month`: actionable focus areas and process improvements.
9. `## Data Limitations` (if applicable)

Rules:
* Provide insight, not a data dump.
* Support every conclusion with the provided data.
* Keep a professional, formal tone.
* Use headings, bullet points, bold text and small tables where they help.
"#;

const GENERAL_PROMPT: &str = r#"You are a helpful project management assistant. Analyze the board data and write a clear, informative project report.

Use Markdown. Where relevant, include:

1. `## Overall Summary`
2. `## Progress on Key Tasks & Milestones`
3. `## Current Status Snapshot`: what is to do, in progress, blocked and completed according to the lists.
4. `## Team Activity Summary`: assignments and task movement, without subjective performance comments.
5. `## Identified Risks & Issues`: blocked or overdue tasks and comments that indicate problems.
6. `## Actionable Insights & Recommendations`
7. `## Data Limitations` (if applicable)

Rules:
* Base the report strictly on the provided data. Do not invent information.
* Use clear language and well-structured Markdown.
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use boardpulse_common::{ActivityMember, Board, BoardList, Label, Member};
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    fn event(id: &str, kind: &str, minutes_ago: i64, data: Value) -> ActivityEvent {
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap();
        ActivityEvent {
            id: id.to_string(),
            action_type: kind.to_string(),
            date: now - Duration::minutes(minutes_ago),
            member_creator: Some(ActivityMember {
                id: "m1".into(),
                full_name: "Ada Lovelace".into(),
                username: "ada".into(),
            }),
            data,
        }
    }

    fn snapshot() -> BoardSnapshot {
        BoardSnapshot {
            board: Board {
                id: "b1".into(),
                name: "Roadmap".into(),
                description: "Q2 delivery plan".into(),
                url: String::new(),
                short_url: String::new(),
            },
            lists: vec![
                BoardList {
                    id: "l2".into(),
                    name: "Done".into(),
                    closed: false,
                    board_id: "b1".into(),
                    pos: 2.0,
                },
                BoardList {
                    id: "l1".into(),
                    name: "Doing".into(),
                    closed: false,
                    board_id: "b1".into(),
                    pos: 1.0,
                },
            ],
            cards: vec![Card {
                id: "c1".into(),
                name: "Ship v2".into(),
                description: "Release notes pending".into(),
                closed: false,
                board_id: "b1".into(),
                list_id: "l1".into(),
                due: Some(Utc.with_ymd_and_hms(2024, 3, 8, 17, 0, 0).unwrap()),
                labels: vec![
                    Label {
                        id: "x".into(),
                        name: "urgent".into(),
                        color: Some("red".into()),
                    },
                    Label {
                        id: "y".into(),
                        name: String::new(),
                        color: Some("green".into()),
                    },
                ],
                member_ids: vec!["m1".into()],
                last_activity: None,
            }],
            members: vec![Member {
                id: "m1".into(),
                full_name: "Ada Lovelace".into(),
                username: "ada".into(),
            }],
            activities: vec![
                event(
                    "a2",
                    "updateCard",
                    5,
                    json!({"card": {"name": "Ship v2"}, "listBefore": {"name": "Todo"}, "listAfter": {"name": "Doing"}}),
                ),
                event(
                    "a1",
                    "createCard",
                    60,
                    json!({"card": {"name": "Ship v2"}, "list": {"name": "Todo"}}),
                ),
            ],
        }
    }

    #[test]
    fn digest_lists_members_lists_and_cards() {
        let digest = format_snapshot(&snapshot());
        assert!(digest.starts_with("# Board: Roadmap"));
        assert!(digest.contains("Description: Q2 delivery plan"));
        assert!(digest.contains("## Members (1)"));
        assert!(digest.contains("- Ada Lovelace (@ada)"));
        assert!(digest.contains("Labels: urgent, green"));
        assert!(digest.contains("Due: 2024-03-08 17:00 UTC"));
        assert!(digest.contains("Assigned: Ada Lovelace"));
        // Done has no cards
        assert!(digest.contains("### List: Done\n\nNo cards in this list."));
        // Lists are ordered by position
        let doing = digest.find("### List: Doing").unwrap();
        let done = digest.find("### List: Done").unwrap();
        assert!(doing < done);
    }

    #[test]
    fn digest_renders_activity_oldest_first() {
        let digest = format_snapshot(&snapshot());
        let created = digest
            .find("Ada Lovelace created card 'Ship v2' in list 'Todo'")
            .unwrap();
        let moved = digest
            .find("Ada Lovelace moved card 'Ship v2' from 'Todo' to 'Doing'")
            .unwrap();
        assert!(created < moved);
        assert!(digest.contains("## Recent Activity (2 actions)"));
    }

    #[test]
    fn digest_notes_missing_activity() {
        let mut snap = snapshot();
        snap.activities.clear();
        let digest = format_snapshot(&snap);
        assert!(digest.contains("No recent activity found."));
    }

    #[test]
    fn unknown_cards_and_actions_are_still_rendered() {
        let mut snap = snapshot();
        snap.cards[0].list_id = "gone".into();
        snap.activities = vec![event("a9", "updateBoard", 1, json!({}))];
        let digest = format_snapshot(&snap);
        assert!(digest.contains("### Unsorted cards"));
        assert!(digest.contains("Ada Lovelace performed action 'updateBoard'"));
    }

    #[test]
    fn describe_comment_and_membership_events() {
        let comment = event(
            "a",
            "commentCard",
            0,
            json!({"card": {"name": "Docs"}, "text": "LGTM"}),
        );
        assert_eq!(describe_activity(&comment), "Ada Lovelace commented on 'Docs': 'LGTM'");

        let added = event(
            "b",
            "addMemberToCard",
            0,
            json!({"card": {"name": "Docs"}, "member": {"name": "Grace Hopper"}}),
        );
        assert_eq!(describe_activity(&added), "Ada Lovelace added Grace Hopper to card 'Docs'");

        let removed = event("c", "removeMemberFromCard", 0, json!({"card": {"name": "Docs"}}));
        assert_eq!(
            describe_activity(&removed),
            "Ada Lovelace removed a member from card 'Docs'"
        );
    }

    #[test]
    fn system_prompt_picks_template() {
        let weekly = system_prompt("weekly");
        let monthly = system_prompt("monthly");
        let general = system_prompt("quarterly");
        assert!(weekly.starts_with(DATA_CONTEXT_PREAMBLE));
        assert!(weekly.contains("## Progress This Week"));
        assert!(monthly.contains("## Recommendations for Upcoming Month"));
        assert!(general.contains("## Overall Summary"));
        assert!(!general.contains("## Progress This Week"));
    }

    #[test]
    fn report_request_uses_type_budget() {
        let snap = snapshot();
        let weekly = build_report_request("m", &snap, ReportType::Weekly);
        let monthly = build_report_request("m", &snap, ReportType::Monthly);
        assert_eq!(weekly.max_tokens, Some(2048));
        assert_eq!(monthly.max_tokens, Some(4096));
        assert_eq!(weekly.temperature, Some(TEMPERATURE));
        assert_eq!(weekly.messages.len(), 2);
        assert_eq!(weekly.messages[0].role, "system");
        assert!(weekly.messages[1].content.contains("# Board: Roadmap"));
    }

    #[test]
    fn chat_request_uses_assistant_prompt() {
        let req = build_chat_request("m", "How many boards do I have?");
        assert_eq!(req.messages[0].content, CHAT_SYSTEM_PROMPT);
        assert_eq!(req.messages[1].content, "How many boards do I have?");
        assert_eq!(req.max_tokens, Some(CHAT_MAX_TOKENS));
    }
}
