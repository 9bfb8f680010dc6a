use super::keys::{session_action_from_key, ScriptedKey};
use crate::gateway::InvitationApi;
use crate::wizard::{FieldKind, InviteSession};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{self, IsTerminal, Stdout};
use std::time::Duration;

const UI_POLL_INTERVAL: Duration = Duration::from_millis(60);
const SCRIPTED_SEARCH_WAIT: Duration = Duration::from_secs(2);
const HIGHLIGHT_MARKER: &str = "> ";
const PLAIN_MARKER: &str = "  ";

pub fn is_interactive_terminal() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

pub fn run_invite_tui<A: InvitationApi>(session: &mut InviteSession<A>) -> Result<(), String> {
    let mut terminal = setup_terminal()?;
    let result = run_event_loop(&mut terminal, session);
    teardown_terminal(&mut terminal)?;
    result
}

pub fn run_invite_scripted<A: InvitationApi>(
    session: &mut InviteSession<A>,
    keys: Vec<ScriptedKey>,
) -> Result<(), String> {
    for key in keys {
        match key {
            ScriptedKey::WaitForSearch => {
                session.wait_for_search(SCRIPTED_SEARCH_WAIT);
            }
            ScriptedKey::Key(key) => {
                if let Some(action) = session_action_from_key(key) {
                    session.handle(action);
                }
            }
        }
        session.poll_search();
        if session.is_finished() {
            return Ok(());
        }
    }
    Err(format!(
        "scripted invite did not finish at step {}; {}",
        session.wizard().current_index() + 1,
        session.status().unwrap_or("end the script with enter on the last step or esc")
    ))
}

fn run_event_loop<A: InvitationApi>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: &mut InviteSession<A>,
) -> Result<(), String> {
    loop {
        session.poll_search();
        draw_invite_ui(terminal, session)?;
        if session.is_finished() {
            return Ok(());
        }

        if !event::poll(UI_POLL_INTERVAL).map_err(|e| format!("failed to poll events: {e}"))? {
            continue;
        }
        let Event::Key(key) = event::read().map_err(|e| format!("failed to read event: {e}"))?
        else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if let Some(action) = session_action_from_key(key) {
            session.handle(action);
        }
    }
}

pub fn header_lines<A: InvitationApi>(session: &InviteSession<A>) -> Vec<String> {
    let wizard = session.wizard();
    vec![
        format!("Invite to {}", wizard.context().name),
        format!(
            "step {}/{}",
            wizard.current_index() + 1,
            wizard.step_count()
        ),
    ]
}

/// Text of the current step: captions, the input line and the candidate list.
pub fn step_body_lines<A: InvitationApi>(session: &InviteSession<A>) -> Vec<String> {
    let wizard = session.wizard();
    let Some(step) = wizard.current_step() else {
        return Vec::new();
    };
    let answers = wizard.answers();
    let context = wizard.context();
    let mut lines = Vec::new();

    for field in &step.fields {
        match field {
            FieldKind::Selection {
                label,
                description,
                link,
                ..
            } => {
                lines.push(label.render(answers, context));
                lines.push(description.render(answers, context));
                if let Some(link) = link {
                    lines.push(format!("{}: {}", link.text, link.href));
                }
                lines.push(String::new());
                lines.push(format!("search> {}", session.input()));
                if session.candidates_open() {
                    let options = session.options();
                    if options.is_empty() && !session.input().trim().is_empty() {
                        lines.push(format!("{PLAIN_MARKER}(no matches)"));
                    }
                    for (index, option) in options.iter().enumerate() {
                        let marker = if index == session.highlighted() {
                            HIGHLIGHT_MARKER
                        } else {
                            PLAIN_MARKER
                        };
                        lines.push(format!("{marker}{}", option.label()));
                    }
                }
            }
            FieldKind::FreeText { label, .. } => {
                lines.push(label.render(answers, context));
                lines.push(format!("> {}", session.input()));
            }
            FieldKind::MultiLineText {
                label, description, ..
            } => {
                lines.push(label.render(answers, context));
                lines.push(description.render(answers, context));
                lines.push(String::new());
                lines.extend(session.input().split('\n').map(|line| format!("| {line}")));
            }
            FieldKind::Summary { label, answer } => {
                let value = answers
                    .get(*answer)
                    .map(|value| value.display_name())
                    .unwrap_or_else(|| "-".to_string());
                lines.push(format!("{label}: {value}"));
            }
            FieldKind::Confirmation { description } => {
                lines.push(description.render(answers, context));
            }
        }
    }
    lines
}

pub fn status_line<A: InvitationApi>(session: &InviteSession<A>) -> String {
    if let Some(status) = session.status() {
        return status.to_string();
    }
    if let Some(err) = session.lookup_error() {
        return format!("search failed: {err}");
    }
    if let Some(hint) = session.create_new_hint() {
        return hint;
    }
    String::new()
}

pub fn hint_line<A: InvitationApi>(session: &InviteSession<A>) -> String {
    let Some(step) = session.wizard().current_step() else {
        return "Esc cancel".to_string();
    };
    let mut parts = vec![format!("Enter {}", step.next_button_text)];
    match step.previous_button_text {
        Some(previous) => parts.push(format!("Esc {previous}")),
        None if session.wizard().current_index() == 0 => parts.push("Esc cancel".to_string()),
        None => {}
    }
    if session.candidates_open() {
        parts.push("Up/Down move".to_string());
    }
    if matches!(step.primary_field(), Some(FieldKind::MultiLineText { .. })) {
        parts.push("Alt+Enter newline".to_string());
    }
    parts.push("Ctrl-C cancel".to_string());
    parts.join(" | ")
}

fn draw_invite_ui<A: InvitationApi>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: &InviteSession<A>,
) -> Result<(), String> {
    let header = header_lines(session);
    let body = step_body_lines(session);
    let status = status_line(session);
    let hint = hint_line(session);
    let blocked = session.wizard().is_blocked() || session.wizard().last_error().is_some();

    terminal
        .draw(|frame| {
            let sections = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(4),
                    Constraint::Min(8),
                    Constraint::Length(3),
                    Constraint::Length(3),
                ])
                .split(frame.area());

            let header_widget =
                Paragraph::new(header.into_iter().map(Line::raw).collect::<Vec<_>>()).block(
                    Block::default()
                        .title("Invite")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Cyan)),
                );
            frame.render_widget(header_widget, sections[0]);

            let body_lines = body
                .into_iter()
                .map(|line| {
                    if line.starts_with(HIGHLIGHT_MARKER) {
                        Line::styled(
                            line,
                            Style::default()
                                .fg(Color::Yellow)
                                .add_modifier(Modifier::BOLD),
                        )
                    } else {
                        Line::raw(line)
                    }
                })
                .collect::<Vec<_>>();
            let body_widget = Paragraph::new(body_lines)
                .block(Block::default().borders(Borders::ALL))
                .wrap(Wrap { trim: false });
            frame.render_widget(body_widget, sections[1]);

            let status_widget = Paragraph::new(status).block(
                Block::default()
                    .title("Status")
                    .borders(Borders::ALL)
                    .border_style(if blocked {
                        Style::default().fg(Color::Red)
                    } else {
                        Style::default()
                    }),
            );
            frame.render_widget(status_widget, sections[2]);

            let hint_widget = Paragraph::new(hint)
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(hint_widget, sections[3]);
        })
        .map_err(|e| format!("failed to render invite UI: {e}"))?;

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, String> {
    enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {e}"))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)
        .map_err(|e| format!("failed to enter alternate screen: {e}"))?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| format!("failed to initialize terminal: {e}"))
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), String> {
    disable_raw_mode().map_err(|e| format!("failed to disable raw mode: {e}"))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)
        .map_err(|e| format!("failed to leave alternate screen: {e}"))?;
    terminal
        .show_cursor()
        .map_err(|e| format!("failed to restore cursor: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{
        GatewayError, InviteError, InviteReceipt, InviteRequest, LookupGateway, Principal,
        PrincipalQuery, Role,
    };
    use crate::shared::{EventLog, MemberId, ProjectId, RoleId};
    use crate::tui::keys::parse_scripted_keys;
    use crate::wizard::{ProjectContext, SessionExit};
    use std::sync::Arc;

    struct RolesOnly;

    impl LookupGateway for RolesOnly {
        fn principals(&self, _query: &PrincipalQuery) -> Result<Vec<Principal>, GatewayError> {
            Ok(Vec::new())
        }

        fn roles(&self, _term: &str) -> Result<Vec<Role>, GatewayError> {
            Ok(vec![Role {
                id: RoleId::parse("3").expect("role"),
                name: "Member".to_string(),
            }])
        }
    }

    struct AcceptAll;

    impl InvitationApi for AcceptAll {
        fn invite(&self, request: &InviteRequest) -> Result<InviteReceipt, InviteError> {
            Ok(InviteReceipt {
                member_id: MemberId::parse("1").expect("member"),
                principal_name: request
                    .invitee
                    .as_ref()
                    .map(|invitee| invitee.describe())
                    .unwrap_or_default(),
            })
        }
    }

    fn session() -> InviteSession<AcceptAll> {
        InviteSession::new(
            ProjectContext::new(ProjectId::parse("7").expect("project"), "Apollo"),
            AcceptAll,
            Arc::new(RolesOnly),
            Duration::from_millis(20),
            EventLog::disabled(),
        )
    }

    #[test]
    fn first_step_lists_principal_types_with_highlight() {
        let session = session();
        let body = step_body_lines(&session);
        assert_eq!(body[0], "Who do you want to invite to Apollo?");
        assert!(body.contains(&"> user".to_string()));
        assert!(body.contains(&"  group".to_string()));
        assert_eq!(header_lines(&session)[1], "step 1/6");
        assert_eq!(hint_line(&session), "Enter Next | Esc cancel | Up/Down move | Ctrl-C cancel");
    }

    #[test]
    fn scripted_run_invites_by_email_and_completes() {
        let mut session = session();
        let keys = parse_scripted_keys(
            "enter,type:new@example.com,wait,enter,type:mem,wait,enter,type:Welcome,enter,enter,enter",
        )
        .expect("keys");
        run_invite_scripted(&mut session, keys).expect("scripted run");
        match session.exit() {
            Some(SessionExit::Completed(Some(receipt))) => {
                assert_eq!(receipt.principal_name, "new@example.com");
            }
            other => panic!("unexpected exit: {other:?}"),
        }
    }

    #[test]
    fn summary_step_lists_answers() {
        let mut session = session();
        let keys = parse_scripted_keys(
            "enter,type:new@example.com,wait,enter,type:mem,wait,enter,type:Hi,enter",
        )
        .expect("keys");
        let err = run_invite_scripted(&mut session, keys).expect_err("stops on summary");
        assert!(err.contains("step 5"));
        assert_eq!(
            step_body_lines(&session),
            vec![
                "User: new@example.com".to_string(),
                "Role: Member".to_string(),
                "Message: Hi".to_string(),
            ]
        );
    }

    #[test]
    fn scripted_run_without_terminal_key_errors() {
        let mut session = session();
        let err = run_invite_scripted(&mut session, Vec::new()).expect_err("unfinished");
        assert!(err.contains("step 1"));
    }
}
