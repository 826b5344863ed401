//! Lists installed into the store at start-up.

use super::item::{ListTitle, TodoItem};

const SEED: &[(&str, &[&str])] = &[
    (
        "Maze of Life & Bidcurement",
        &[
            "Wireframe ideas for MOL",
            "Finish fleshing out a navigation interface",
            "Build a todo app app showcasing firebase auth in golang",
            "Build a frontend client in expo for mobile showcasing its web and mobile capabilities",
        ],
    ),
    (
        "Rivrb",
        &[
            "Go on a walk",
            "Continue learning rust",
            "Build a todo app",
        ],
    ),
    (
        "Personal",
        &[
            "Migrate old codebase in CRA CLI to Expo",
            "Make sure firebase does everything intended",
            "Implement XD design where things might have messed up",
        ],
    ),
];

/// Returns the seed lists with sequential ids starting at 1, all open.
#[must_use]
pub fn seed_lists() -> Vec<(ListTitle, Vec<TodoItem>)> {
    SEED.iter()
        .filter_map(|(title, texts)| {
            let items = (1_i32..)
                .zip(texts.iter())
                .map(|(id, text)| TodoItem::new(id, *text, false))
                .collect();
            ListTitle::new(*title).map(|title| (title, items))
        })
        .collect()
}
