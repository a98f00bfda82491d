use crate::game::ClientGameState;
use macroquad::prelude::*;
use shared::{GameStatus, Symbol, BOARD_CELLS, BOARD_SIZE};

/// Screen placement of the 3x3 board
#[derive(Debug, Clone, Copy)]
pub struct BoardLayout {
    pub origin_x: f32,
    pub origin_y: f32,
    pub cell_size: f32,
}

impl BoardLayout {
    /// Centers the board horizontally, leaving room for text above and below
    pub fn for_window(width: f32, height: f32) -> Self {
        let cell_size = (width.min(height - 160.0) / BOARD_SIZE as f32).max(40.0) * 0.9;
        let board_size = cell_size * BOARD_SIZE as f32;

        Self {
            origin_x: (width - board_size) / 2.0,
            origin_y: 100.0,
            cell_size,
        }
    }

    pub fn board_size(&self) -> f32 {
        self.cell_size * BOARD_SIZE as f32
    }

    /// Maps a screen position to a cell index
    pub fn cell_at(&self, x: f32, y: f32) -> Option<usize> {
        let local_x = x - self.origin_x;
        let local_y = y - self.origin_y;
        let size = self.board_size();

        if local_x < 0.0 || local_y < 0.0 || local_x >= size || local_y >= size {
            return None;
        }

        let column = (local_x / self.cell_size) as usize;
        let row = (local_y / self.cell_size) as usize;
        Some(row * BOARD_SIZE + column)
    }

    /// Top-left corner of a cell
    pub fn cell_origin(&self, cell: usize) -> (f32, f32) {
        let row = cell / BOARD_SIZE;
        let column = cell % BOARD_SIZE;
        (
            self.origin_x + column as f32 * self.cell_size,
            self.origin_y + row as f32 * self.cell_size,
        )
    }
}

pub struct Renderer {
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Renderer {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn layout(&self) -> BoardLayout {
        BoardLayout::for_window(self.width, self.height)
    }

    pub fn render(&self, state: &ClientGameState, join_code: Option<&str>) {
        clear_background(Color::from_rgba(26, 26, 26, 255));

        let layout = self.layout();
        self.draw_header(state);
        self.draw_grid(&layout);

        for cell in 0..BOARD_CELLS {
            match state.board.get(cell) {
                Some(Symbol::X) => self.draw_x(&layout, cell),
                Some(Symbol::O) => self.draw_o(&layout, cell),
                None => {}
            }
        }

        self.draw_footer(state, join_code);
    }

    fn draw_header(&self, state: &ClientGameState) {
        let connection_color = if state.is_connected() { GREEN } else { RED };
        draw_rectangle(10.0, 10.0, 8.0, 8.0, connection_color);
        draw_text("CON", 22.0, 18.0, 14.0, WHITE);

        if let Some(room_code) = &state.room_code {
            draw_text(&format!("Room {}", room_code), 10.0, 45.0, 28.0, WHITE);
        }

        if let Some(symbol) = state.my_symbol {
            let symbol_color = symbol_color(symbol);
            draw_text(&format!("You are {}", symbol), 10.0, 75.0, 24.0, symbol_color);
        }

        if let GameStatus::Won(symbol) = state.status {
            let text = if Some(symbol) == state.my_symbol {
                "You won"
            } else {
                "You lost"
            };
            draw_text(text, self.width - 140.0, 45.0, 28.0, symbol_color(symbol));
        }
    }

    fn draw_grid(&self, layout: &BoardLayout) {
        let size = layout.board_size();
        let line_color = Color::from_rgba(136, 136, 136, 255);

        for i in 1..BOARD_SIZE {
            let offset = i as f32 * layout.cell_size;
            draw_line(
                layout.origin_x + offset,
                layout.origin_y,
                layout.origin_x + offset,
                layout.origin_y + size,
                4.0,
                line_color,
            );
            draw_line(
                layout.origin_x,
                layout.origin_y + offset,
                layout.origin_x + size,
                layout.origin_y + offset,
                4.0,
                line_color,
            );
        }
    }

    fn draw_x(&self, layout: &BoardLayout, cell: usize) {
        let (x, y) = layout.cell_origin(cell);
        let margin = layout.cell_size * 0.2;
        let far = layout.cell_size - margin;
        let color = symbol_color(Symbol::X);

        draw_line(x + margin, y + margin, x + far, y + far, 6.0, color);
        draw_line(x + far, y + margin, x + margin, y + far, 6.0, color);
    }

    fn draw_o(&self, layout: &BoardLayout, cell: usize) {
        let (x, y) = layout.cell_origin(cell);
        let half = layout.cell_size / 2.0;

        draw_circle_lines(
            x + half,
            y + half,
            half * 0.6,
            6.0,
            symbol_color(Symbol::O),
        );
    }

    fn draw_footer(&self, state: &ClientGameState, join_code: Option<&str>) {
        let y = self.height - 50.0;

        match join_code {
            Some(code) => {
                let text = format!("Room code: {}_  (Enter to join, Esc to cancel)", code);
                draw_text(&text, 10.0, y, 22.0, YELLOW);
            }
            None => {
                draw_text(&state.message, 10.0, y, 22.0, WHITE);
            }
        }

        draw_text(
            "C create  J join  R reset  Esc quit",
            10.0,
            self.height - 20.0,
            16.0,
            Color::from_rgba(136, 136, 136, 255),
        );
    }
}

fn symbol_color(symbol: Symbol) -> Color {
    match symbol {
        Symbol::X => Color::from_rgba(0, 170, 255, 255),
        Symbol::O => Color::from_rgba(255, 68, 68, 255),
    }
}
