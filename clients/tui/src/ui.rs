use blackjack::{Action, Card, HandOutcome, HandStatus, PlayerHand, RoundPhase, Suit};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

const RULES: [&str; 12] = [
    "The goal of blackjack is to beat the dealer's hand without going over 21.",
    "Face cards are worth 10. Aces are worth 1 or 11, whichever makes a better hand.",
    "Each player starts with two cards, one of the dealer's cards is hidden until the end.",
    "To 'Hit' is to ask for another card. To 'Stand' is to hold your total and end your turn.",
    "If you go over 21 you bust, and the dealer wins regardless of the dealer's hand.",
    "If you are dealt 21 from the start (Ace & 10), you got a blackjack.",
    "Blackjack pays extra on top of your bet, 3:2 unless the table says otherwise.",
    "The dealer hits until reaching 17 or higher.",
    "Doubling is like a hit, only the bet is doubled and you get exactly one more card.",
    "A pair can be split once into two hands, each carrying the original bet.",
    "You can only double on a hand's first two cards, with a total of 11 or less.",
    "Leaving the table mid-hand forfeits the bet.",
];

fn suit_color(suit: Suit) -> Color {
    match suit {
        Suit::Hearts => Color::Red,
        Suit::Diamonds => Color::from_u32(0xFF_A5_00), // Orange
        Suit::Clubs => Color::Magenta,
        Suit::Spades => Color::Black,
    }
}

fn card_span(card: Option<Card>) -> Span<'static> {
    match card {
        Some(card) => Span::styled(
            format!("{card} "),
            Style::default().fg(suit_color(card.suit)).bg(Color::Gray),
        ),
        None => Span::styled("?? ", Style::default().fg(Color::White).bg(Color::Gray)),
    }
}

fn action_style(action: Action, advised: Option<Action>) -> Style {
    if advised == Some(action) {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow)
    }
}

fn outcome_style(outcome: HandOutcome) -> Style {
    match outcome {
        HandOutcome::Win | HandOutcome::Blackjack => {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        }
        HandOutcome::Loss | HandOutcome::Bust => {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        }
        HandOutcome::Push => Style::default().fg(Color::DarkGray),
    }
}

fn hand_label(index: usize, count: usize, player_hand: &PlayerHand) -> String {
    let score = player_hand.hand.score();
    if player_hand.from_split {
        format!(" Split hand {} ({score}) ", index + 1)
    } else if count > 1 {
        format!(" Hand {} ({score}) ", index + 1)
    } else {
        format!(" Player ({score}) ")
    }
}

pub fn ui(f: &mut Frame, app: &App) {
    let engine = &app.engine;

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3), // Title bar
                Constraint::Min(10),   // Table
                Constraint::Length(3), // Status bar
            ]
            .as_ref(),
        )
        .split(f.area());

    let stats = engine.stats();
    let title = Paragraph::new(format!(
        "Blackjack | Funds {} | True count {} | Shoe {} cards | W {} L {} P {} BJ {}",
        engine.funds(),
        engine.true_count(),
        engine.cards_remaining(),
        stats.wins,
        stats.losses + stats.busts,
        stats.pushes,
        stats.blackjacks
    ))
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, main_chunks[0]);

    let (game_container, log_area) = if app.log_visible {
        let main_horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)].as_ref())
            .split(main_chunks[1]);
        (main_horizontal[0], Some(main_horizontal[1]))
    } else {
        (main_chunks[1], None)
    };

    if app.rules_visible {
        render_rules(f, app, game_container);
    } else {
        render_table(f, app, game_container);
    }

    if let Some(log_area) = log_area {
        let log_frame_height = log_area.height.saturating_sub(2) as usize;
        let log_start_idx = app.logs.len().saturating_sub(log_frame_height);

        let log_lines: Vec<Line> = app
            .logs
            .iter()
            .skip(log_start_idx)
            .map(|log| {
                Line::from(vec![
                    Span::styled("• ", Style::default().fg(Color::DarkGray)),
                    Span::raw(log.clone()),
                ])
            })
            .collect();

        let logs_widget = Paragraph::new(log_lines)
            .block(
                Block::default()
                    .title(" Game Log ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Green)),
            )
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: true });
        f.render_widget(logs_widget, log_area);
    }

    let status_bar = Paragraph::new(app.status.as_str())
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status_bar, main_chunks[2]);
}

fn render_rules(f: &mut Frame, app: &App, area: Rect) {
    let rules = app.engine.rules();
    let mut lines: Vec<Line> = RULES.iter().map(|r| Line::from(format!("- {r}"))).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "This table: {} decks, blackjack pays {}:{}, dealer {} soft 17",
        rules.num_decks,
        rules.blackjack_payout.numerator,
        rules.blackjack_payout.denominator,
        if rules.dealer_hits_soft_17 { "hits" } else { "stands on" }
    )));

    let rules_block = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Rules [R] / [Esc] to close ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(rules_block, area);
}

/// Dealer on top, player hands side by side below.
fn render_table(f: &mut Frame, app: &App, area: Rect) {
    let engine = &app.engine;
    let game_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);

    let view = engine.dealer_view();
    let dealer_cards: Vec<Span> = view.cards.iter().map(|c| card_span(*c)).collect();
    let dealer_title = if view.cards.is_empty() {
        " Dealer ".to_string()
    } else {
        format!(" Dealer ({}) ", view.score)
    };

    let dealer_block_height = game_area[0].height.saturating_sub(2);
    let mut dealer_lines: Vec<Line> = Vec::new();
    if engine.phase() == RoundPhase::PlayerTurn {
        let legal = engine.legal_actions();
        let advised = engine.recommendation();

        let mut instruction_spans = vec![
            Span::styled("↑", action_style(Action::Hit, advised)),
            Span::raw(" Hit  "),
            Span::styled("↓", action_style(Action::Stand, advised)),
            Span::raw(" Stand"),
        ];
        if legal.double_down {
            instruction_spans.push(Span::raw("  "));
            instruction_spans.push(Span::styled("→", action_style(Action::DoubleDown, advised)));
            instruction_spans.push(Span::raw(" Double"));
        }
        if legal.split {
            instruction_spans.push(Span::raw("  "));
            instruction_spans.push(Span::styled("←", action_style(Action::Split, advised)));
            instruction_spans.push(Span::raw(" Split"));
        }

        // cards + spacing + instructions
        let padding_top = dealer_block_height.saturating_sub(3) / 2;
        dealer_lines.extend(vec![Line::from(""); padding_top as usize]);
        dealer_lines.push(Line::from(dealer_cards));
        dealer_lines.push(Line::from(""));
        dealer_lines.push(Line::from(instruction_spans));
    } else {
        let padding_top = dealer_block_height / 2;
        dealer_lines.extend(vec![Line::from(""); padding_top as usize]);
        if dealer_cards.is_empty() {
            dealer_lines.push(Line::from("Waiting for your bet"));
        } else {
            dealer_lines.push(Line::from(dealer_cards));
        }
    }

    let dealer_block = Paragraph::new(dealer_lines)
        .block(Block::default().title(dealer_title).borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(dealer_block, game_area[0]);

    let hands = engine.player_hands();
    if hands.is_empty() {
        let empty = Paragraph::new("No cards dealt")
            .block(Block::default().title(" Player ").borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(empty, game_area[1]);
        return;
    }

    let hand_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, hands.len() as u32); hands.len()])
        .split(game_area[1]);
    let active = engine.active_hand_index();
    let results = engine.results();

    for (i, player_hand) in hands.iter().enumerate() {
        let spans: Vec<Span> = player_hand
            .hand
            .cards()
            .iter()
            .map(|c| card_span(Some(*c)))
            .collect();

        // Active hand during play, outcome once settled
        let border_style = if active == Some(i) {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if let Some(result) = results.get(i) {
            outcome_style(result.outcome)
        } else {
            Style::default()
        };

        let hand_width = hand_areas[i].width.saturating_sub(2);
        let card_width = 4; // "10♥ " is the widest card
        let cards_per_line = (hand_width / card_width).max(1) as usize;
        let wrapped: Vec<Line> = spans
            .chunks(cards_per_line)
            .map(|chunk| Line::from(chunk.to_vec()))
            .collect();

        let hand_block_height = hand_areas[i].height.saturating_sub(2);
        let padding_top = hand_block_height.saturating_sub(wrapped.len() as u16 + 1) / 2;
        let mut lines: Vec<Line> = vec![Line::from(""); padding_top as usize];
        lines.extend(wrapped);
        let footer = match (results.get(i), player_hand.status) {
            (Some(result), _) => format!("{:?} {:+}", result.outcome, result.net()),
            (None, HandStatus::Waiting) => "waiting".to_string(),
            (None, HandStatus::Doubled) => format!("doubled, bet {}", player_hand.stake),
            (None, _) => format!("bet {}", player_hand.stake),
        };
        lines.push(Line::from(Span::styled(footer, Style::default().fg(Color::DarkGray))));

        let hand_block = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(hand_label(i, hands.len(), player_hand))
                    .borders(Borders::ALL)
                    .border_style(border_style),
            )
            .alignment(Alignment::Center);
        f.render_widget(hand_block, hand_areas[i]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackjack::{Hand, Rank};

    fn player_hand(ranks: &[Rank], from_split: bool) -> PlayerHand {
        PlayerHand {
            hand: Hand::from_cards(ranks.iter().map(|r| Card::new(*r, Suit::Hearts)).collect()),
            stake: 100,
            status: HandStatus::Playing,
            from_split,
        }
    }

    #[test]
    fn test_hand_labels() {
        let single = player_hand(&[Rank::Ten, Rank::Nine], false);
        assert_eq!(hand_label(0, 1, &single), " Player (19) ");

        let split = player_hand(&[Rank::Eight, Rank::Three], true);
        assert_eq!(hand_label(1, 2, &split), " Split hand 2 (11) ");
    }
}
