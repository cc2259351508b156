use quiz_core::model::Question;
use quiz_core::table::TableView;

/// Lines for one question as laid out at the table, answer hidden.
pub fn describe(number: usize, question: &Question) -> Vec<String> {
    let table = TableView::for_question(question);
    let mut lines = vec![
        format!("#{number}  {}", question.prompt()),
        format!("  Hero: {}", table.hero),
    ];
    if !table.hole_cards.is_empty() {
        lines.push(format!("  Hole cards: {}", table.hole_cards.join(" ")));
    }
    if !table.community_cards.is_empty() {
        lines.push(format!("  Board: {}", table.community_cards.join(" ")));
    }
    for seat in &table.opponents {
        lines.push(format!("  {:<4} {}", seat.seat.to_string(), seat.action));
    }
    lines.push(format!("  Options: {}", question.options().join(" / ")));
    lines
}

pub fn print_questions(questions: &[Question]) {
    if questions.is_empty() {
        println!("No questions available.");
    }
    for (i, question) in questions.iter().enumerate() {
        if i > 0 {
            println!();
        }
        for line in describe(i + 1, question) {
            println!("{line}");
        }
    }
}
