//! Chess board in its initial position and the draws that show it.
//!
//! The board is indexed `[column][row]`: column `i` runs along X, row `j`
//! along Z. Black starts on rows 0 and 1, white on rows 6 and 7.

use crate::core::math::Vector3;
use crate::pipeline::graphics::{Graphics, GraphicsError};
use crate::pipeline::queue::MeshId;
use crate::scene::material::Material;
use log::{info, warn};
use std::f32::consts::FRAC_PI_2;
use std::path::Path;

pub const BOARD_SIZE: usize = 8;
pub const CELL_WIDTH: f32 = 1.5;
pub const CELL_DEPTH: f32 = 1.5;
/// Cells are slabs below the y = 0 plane the pieces stand on.
pub const BOARD_HEIGHT: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::King,
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    /// Model file name without extension.
    pub fn file_stem(self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::King => "king",
            PieceKind::Queen => "queen",
            PieceKind::Rook => "rook",
            PieceKind::Bishop => "bishop",
            PieceKind::Knight => "knight",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    White,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub side: Side,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(side: Side, kind: PieceKind) -> Self {
        Self { side, kind }
    }
}

/// Static 8×8 placement, no move logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Standard opening position, kings on column 3 and queens on column 4.
    pub fn initial() -> Self {
        use PieceKind::*;
        const BACK_RANK: [PieceKind; BOARD_SIZE] =
            [Rook, Knight, Bishop, King, Queen, Bishop, Knight, Rook];

        let mut board = Self::empty();
        for (i, &kind) in BACK_RANK.iter().enumerate() {
            board.cells[i][0] = Some(Piece::new(Side::Black, kind));
            board.cells[i][1] = Some(Piece::new(Side::Black, Pawn));
            board.cells[i][6] = Some(Piece::new(Side::White, Pawn));
            board.cells[i][7] = Some(Piece::new(Side::White, kind));
        }
        board
    }

    /// `None` for an empty cell or coordinates off the board.
    pub fn get(&self, column: usize, row: usize) -> Option<Piece> {
        *self.cells.get(column)?.get(row)?
    }

    pub fn set(&mut self, column: usize, row: usize, piece: Option<Piece>) {
        if let Some(cell) = self.cells.get_mut(column).and_then(|c| c.get_mut(row)) {
            *cell = piece;
        }
    }

    /// Occupied cells as `(column, row, piece)`.
    pub fn pieces(&self) -> impl Iterator<Item = (usize, usize, Piece)> + '_ {
        self.cells.iter().enumerate().flat_map(|(i, column)| {
            column
                .iter()
                .enumerate()
                .filter_map(move |(j, cell)| cell.map(|piece| (i, j, piece)))
        })
    }
}

/// Mesh used for each piece kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceModels {
    meshes: [MeshId; 6],
}

impl PieceModels {
    /// Every kind drawn with the same mesh.
    pub fn uniform(mesh: MeshId) -> Self {
        Self { meshes: [mesh; 6] }
    }

    /// Loads `<dir>/<kind>.obj` for every kind. A model that fails to load
    /// is replaced by the built-in sphere.
    pub fn load(graphics: &mut Graphics, dir: &Path) -> Self {
        let mut models = Self::uniform(MeshId::SPHERE);
        for kind in PieceKind::ALL {
            let path = dir.join(format!("{}.obj", kind.file_stem()));
            match graphics.load_model(&path) {
                Ok(id) => models.meshes[kind.index()] = id,
                Err(e) => warn!("Couldn't load {}: {}. Drawing a sphere instead", path.display(), e),
            }
        }
        info!("Piece models ready from {}", dir.display());
        models
    }

    pub fn mesh(&self, kind: PieceKind) -> MeshId {
        self.meshes[kind.index()]
    }
}

/// Glossy black or white, alternating like a real board.
pub fn cell_material(column: usize, row: usize) -> Material {
    if (column + row) % 2 == 1 {
        Material::new(Vector3::zeros(), 0.0, 0.0)
    } else {
        Material::new(Vector3::repeat(1.0), 0.0, 0.0)
    }
}

pub fn piece_material(side: Side) -> Material {
    match side {
        Side::Black => Material::new(Vector3::zeros(), 0.0, 0.0),
        Side::White => Material::new(Vector3::repeat(1.0), 0.0, 0.0),
    }
}

/// Yaw that turns each side's pieces to face the opponent.
pub fn piece_rotation(side: Side) -> f32 {
    match side {
        Side::Black => -FRAC_PI_2,
        Side::White => FRAC_PI_2,
    }
}

/// Center of the top face of a cell.
pub fn cell_center(column: usize, row: usize) -> Vector3 {
    Vector3::new(
        CELL_WIDTH * (column as f32 + 0.5),
        0.0,
        CELL_DEPTH * (row as f32 + 0.5),
    )
}

/// Queues one frame of the board: every cell, then the piece standing on it.
/// Returns how many draws the queue accepted.
pub fn submit(
    board: &Board,
    models: &PieceModels,
    graphics: &mut Graphics,
) -> Result<usize, GraphicsError> {
    let mut queued = 0;
    for i in 0..BOARD_SIZE {
        for j in 0..BOARD_SIZE {
            queued += usize::from(graphics.draw_cube(
                CELL_WIDTH * i as f32,
                -BOARD_HEIGHT,
                CELL_DEPTH * j as f32,
                CELL_WIDTH,
                BOARD_HEIGHT,
                CELL_DEPTH,
                cell_material(i, j),
            ));

            let Some(piece) = board.get(i, j) else {
                continue;
            };
            queued += usize::from(graphics.draw_model(
                models.mesh(piece.kind),
                cell_center(i, j),
                Vector3::repeat(1.0),
                Vector3::new(0.0, piece_rotation(piece.side), 0.0),
                piece_material(piece.side),
            )?);
        }
    }
    Ok(queued)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::Config;

    #[test]
    fn initial_position_has_sixteen_pieces_per_side() {
        let board = Board::initial();
        let pieces: Vec<_> = board.pieces().collect();
        assert_eq!(pieces.len(), 32);
        assert_eq!(pieces.iter().filter(|(_, _, p)| p.side == Side::Black).count(), 16);

        for i in 0..BOARD_SIZE {
            assert_eq!(board.get(i, 1), Some(Piece::new(Side::Black, PieceKind::Pawn)));
            assert_eq!(board.get(i, 6), Some(Piece::new(Side::White, PieceKind::Pawn)));
            for j in 2..6 {
                assert_eq!(board.get(i, j), None);
            }
        }
    }

    #[test]
    fn back_ranks_mirror_each_other() {
        let board = Board::initial();
        assert_eq!(board.get(3, 0), Some(Piece::new(Side::Black, PieceKind::King)));
        assert_eq!(board.get(3, 7), Some(Piece::new(Side::White, PieceKind::King)));
        assert_eq!(board.get(4, 0).map(|p| p.kind), Some(PieceKind::Queen));
        assert_eq!(board.get(1, 7).map(|p| p.kind), Some(PieceKind::Knight));
        assert_eq!(board.get(5, 0).map(|p| p.kind), Some(PieceKind::Bishop));
        assert_eq!(board.get(7, 7).map(|p| p.kind), Some(PieceKind::Rook));
        assert_eq!(board.get(8, 0), None);
    }

    #[test]
    fn cells_alternate_colors() {
        assert_eq!(cell_material(0, 0).base_color, Vector3::repeat(1.0));
        assert_eq!(cell_material(1, 0).base_color, Vector3::zeros());
        assert_eq!(cell_material(3, 4).base_color, Vector3::zeros());
        assert_eq!(cell_material(7, 7).base_color, Vector3::repeat(1.0));
    }

    #[test]
    fn submit_queues_cells_and_pieces() {
        let mut config = Config::default();
        config.render.width = 8;
        config.render.height = 8;
        config.render.sphere_segments = 4;
        let mut graphics = Graphics::with_environment(&config, None);

        let queued = submit(&Board::initial(), &PieceModels::uniform(MeshId::SPHERE), &mut graphics)
            .unwrap();
        assert_eq!(queued, 96);

        let commands: Vec<_> = graphics.queue().iter().copied().collect();
        assert_eq!(commands.len(), 96);
        // cell (0,0) then the black rook standing on it
        assert_eq!(commands[0].mesh, MeshId::CUBE);
        assert_eq!(commands[0].model.transform_point(Vector3::zeros()), Vector3::new(0.0, -0.5, 0.0));
        assert_eq!(commands[1].mesh, MeshId::SPHERE);
        assert_eq!(commands[1].model.transform_point(Vector3::zeros()), Vector3::new(0.75, 0.0, 0.75));
        // a -90° turn about Y swings local +Z round to -X
        let facing = commands[1].model.transform_vector(Vector3::z_axis());
        assert!((facing - Vector3::new(-1.0, 0.0, 0.0)).length() < 1e-5, "{facing:?}");
    }

    #[test]
    fn missing_models_fall_back_to_the_sphere() {
        let mut config = Config::default();
        config.render.width = 4;
        config.render.height = 4;
        config.render.sphere_segments = 4;
        let mut graphics = Graphics::with_environment(&config, None);

        let models = PieceModels::load(&mut graphics, Path::new("/nonexistent/pieces"));
        for kind in PieceKind::ALL {
            assert_eq!(models.mesh(kind), MeshId::SPHERE);
        }
    }
}
