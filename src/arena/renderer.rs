use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::entities::{BonusKind, EnemyKind, Stance};
use super::gesture::GestureLabel;
use super::log::EventLog;
use super::simulation::{GameState, Phase, MAX_LIVES};
use crate::core::renderer::Renderer;

/// Borrowed snapshot handed to the renderer each frame.
pub struct ArenaView<'a> {
    pub state: &'a GameState,
    pub log: &'a EventLog,
    pub show_help: bool,
    pub hand_visible: bool,
    pub confirm_quit: bool,
}

pub struct ArenaRenderer;

impl<'a> Renderer<ArenaView<'a>> for ArenaRenderer {
    fn render(&self, frame: &mut Frame, view: &ArenaView<'a>) {
        let [arena_area, side_area] =
            Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)])
                .areas(frame.area());
        let [stats_area, missions_area, log_area] = Layout::vertical([
            Constraint::Length(8),
            Constraint::Length(4),
            Constraint::Min(4),
        ])
        .areas(side_area);

        draw_arena(frame, arena_area, view.state);
        draw_stats(frame, stats_area, view);
        draw_missions(frame, missions_area, view.state);
        draw_log(frame, log_area, view.log);

        if view.confirm_quit {
            draw_banner(
                frame,
                arena_area,
                "Quit the game?",
                &["Y - quit", "any other key - stay"],
                Color::Magenta,
            );
            return;
        }

        if view.show_help {
            draw_help(frame, arena_area);
            return;
        }

        let difficulty = format!("D - difficulty: {}", view.state.difficulty);
        match view.state.phase {
            Phase::Menu => draw_banner(
                frame,
                arena_area,
                "✋ GESTURE ARENA",
                &[
                    "Press Enter to start",
                    difficulty.as_str(),
                    "H - controls, Q - quit",
                ],
                Color::Cyan,
            ),
            Phase::Paused => draw_banner(
                frame,
                arena_area,
                "PAUSED",
                &["Space - resume", "R - restart, Q - quit"],
                Color::Yellow,
            ),
            Phase::GameOver => {
                let score = format!("Score: {}", view.state.score);
                let level = format!("Level: {}", view.state.level);
                draw_banner(
                    frame,
                    arena_area,
                    "💀 GAME OVER",
                    &[score.as_str(), level.as_str(), "R - new game"],
                    Color::Red,
                )
            }
            Phase::Running => {}
        }
    }
}

fn draw_arena(frame: &mut Frame, area: Rect, state: &GameState) {
    let arena = state.entities.arena();
    let (width, height) = (arena.width as f64, arena.height as f64);
    // canvas y grows upwards
    let flip = move |y: f32| height - y as f64;

    let canvas = Canvas::default()
        .block(Block::bordered().title(" ARENA "))
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            for bonus in state.entities.bonuses().iter().filter(|b| !b.collected) {
                let color = match bonus.kind {
                    BonusKind::Health => Color::Red,
                    BonusKind::Points => Color::Yellow,
                    BonusKind::Speed => Color::Cyan,
                };
                ctx.draw(&Circle { x: bonus.x as f64, y: flip(bonus.y), radius: 15.0, color });
            }
            ctx.layer();

            for enemy in state.entities.enemies() {
                let color = match enemy.kind {
                    EnemyKind::Normal => Color::LightRed,
                    EnemyKind::Strong => Color::Red,
                };
                ctx.draw(&Circle { x: enemy.x as f64, y: flip(enemy.y), radius: 20.0, color });
            }
            ctx.layer();

            let player = &state.player;
            let (x, y) = (player.x as f64, flip(player.y));
            match player.stance {
                Stance::Attacking => {
                    ctx.draw(&Circle { x, y, radius: 40.0, color: Color::Red });
                    ctx.draw(&Circle { x, y, radius: 50.0, color: Color::LightRed });
                }
                Stance::Defending => {
                    ctx.draw(&Circle { x, y, radius: 40.0, color: Color::Green });
                    ctx.draw(&Circle { x, y, radius: 45.0, color: Color::LightGreen });
                }
                Stance::Neutral => ctx.draw(&Circle { x, y, radius: 30.0, color: Color::Blue }),
            }
            ctx.draw(&Circle { x, y: y + 20.0, radius: 15.0, color: Color::White });
            ctx.print(x, y + 50.0, state.current_gesture.glyph().to_string());
        });
    frame.render_widget(canvas, area);
}

fn draw_stats(frame: &mut Frame, area: Rect, view: &ArenaView<'_>) {
    let state = view.state;
    let hearts: String = (0..MAX_LIVES)
        .map(|i| if i < state.lives { '♥' } else { '♡' })
        .collect();
    let gesture = match state.current_gesture {
        GestureLabel::None => "-".to_string(),
        gesture => format!("{} ({})", gesture, gesture.action()),
    };
    let hand = if view.hand_visible { "hand in view" } else { "no hand" };

    let label = Style::default().add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(vec![Span::styled("Score: ", label), Span::raw(state.score.to_string())]),
        Line::from(vec![Span::styled("Level: ", label), Span::raw(state.level.to_string())]),
        Line::from(vec![
            Span::styled("Lives: ", label),
            Span::styled(hearts, Style::default().fg(Color::Red)),
        ]),
        Line::from(vec![Span::styled("Gesture: ", label), Span::raw(gesture)]),
        Line::from(vec![
            Span::styled("Difficulty: ", label),
            Span::raw(state.difficulty.to_string()),
        ]),
        Line::from(Span::styled(hand, Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(Paragraph::new(lines).block(Block::bordered().title(" STATUS ")), area);
}

fn draw_missions(frame: &mut Frame, area: Rect, state: &GameState) {
    let lines: Vec<Line> = state
        .missions
        .missions()
        .iter()
        .map(|mission| {
            let mark = if mission.completed { "[x]" } else { "[ ]" };
            let progress = mission.progress.min(mission.kind.target());
            let style = if mission.completed {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            Line::styled(
                format!("{mark} {} ({progress}/{})", mission.kind.title(), mission.kind.target()),
                style,
            )
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(Block::bordered().title(" MISSIONS ")), area);
}

fn draw_log(frame: &mut Frame, area: Rect, log: &EventLog) {
    let lines: Vec<Line> = log
        .entries()
        .map(|entry| {
            Line::from(vec![
                Span::styled(format!("> {} ", entry.stamp()), Style::default().fg(Color::DarkGray)),
                Span::raw(entry.message.as_str()),
            ])
        })
        .collect();
    let paragraph = Paragraph::new(lines)
        .block(Block::bordered().title(" LOG "))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_banner(frame: &mut Frame, area: Rect, title: &str, body: &[&str], color: Color) {
    let mut lines = vec![
        Line::styled(title.to_string(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Line::raw(""),
    ];
    lines.extend(body.iter().map(|text| Line::raw(text.to_string())));

    let popup = centered(area, 36, lines.len() as u16 + 2);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(Block::bordered()),
        popup,
    );
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let gestures = [
        GestureLabel::Fist,
        GestureLabel::Palm,
        GestureLabel::OneFinger,
        GestureLabel::TwoFingers,
        GestureLabel::ThreeFingers,
        GestureLabel::FiveFingers,
    ];
    let mut lines: Vec<Line> = gestures
        .iter()
        .enumerate()
        .map(|(i, g)| Line::raw(format!("{}  {:<14} {}", i + 1, g.to_string(), g.action())))
        .collect();
    lines.push(Line::raw(""));
    lines.push(Line::raw("Enter start  Space pause  Esc menu"));
    lines.push(Line::raw("R restart  H help  Q quit"));
    lines.push(Line::raw("D difficulty (in the menu)"));

    let popup = centered(area, 44, lines.len() as u16 + 2);
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(Block::bordered().title(" CONTROLS ")), popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::events::event_channel;
    use crate::arena::simulation::{Command, GameSimulation};
    use crate::config::GameConfig;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::Instant;

    fn screen_text(sim: &GameSimulation, show_help: bool) -> String {
        render_text(sim, show_help, false)
    }

    fn render_text(sim: &GameSimulation, show_help: bool, confirm_quit: bool) -> String {
        let log = EventLog::new(Instant::now());
        let view = ArenaView {
            state: sim.state(),
            log: &log,
            show_help,
            hand_visible: false,
            confirm_quit,
        };
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| ArenaRenderer.render(f, &view)).unwrap();
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn renders_hud_and_menu_banner() {
        let (sink, _rx) = event_channel();
        let sim = GameSimulation::new(GameConfig { seed: Some(5), ..GameConfig::default() }, sink)
            .unwrap();
        let text = screen_text(&sim, false);
        assert!(text.contains("Score: 0"));
        assert!(text.contains("Press Enter to start"));
        assert!(text.contains("Destroy 10 enemies (0/10)"));
        assert!(text.contains("D - difficulty: medium"));
    }

    #[test]
    fn quit_prompt_covers_other_banners() {
        let (sink, _rx) = event_channel();
        let sim = GameSimulation::new(GameConfig { seed: Some(5), ..GameConfig::default() }, sink)
            .unwrap();
        let text = render_text(&sim, true, true);
        assert!(text.contains("Quit the game?"));
        assert!(!text.contains("CONTROLS"));
        assert!(!text.contains("Press Enter to start"));
    }

    #[test]
    fn paused_banner_and_help() {
        let (sink, _rx) = event_channel();
        let mut sim =
            GameSimulation::new(GameConfig { seed: Some(5), ..GameConfig::default() }, sink)
                .unwrap();
        sim.command(Command::Start);
        sim.command(Command::Pause);
        assert!(screen_text(&sim, false).contains("PAUSED"));

        let text = screen_text(&sim, true);
        assert!(text.contains("CONTROLS"));
        assert!(!text.contains("PAUSED"));
    }
}
