use three_d::*;

use crate::game::{GameState, Grid, Position};

const BACKGROUND: (f32, f32, f32) = (6.0 / 255.0, 6.0 / 255.0, 20.0 / 255.0);
const SNAKE_RGB: (u8, u8, u8) = (6, 182, 212);
const FOOD_RGB: (u8, u8, u8) = (236, 72, 153);

// Draw layers, back to front.
const GRID_Z: f32 = 0.01;
const FOOD_Z: f32 = 0.02;
const SNAKE_Z: f32 = 0.03;

const GRID_LINE_WIDTH: f32 = 0.004;
const BORDER_WIDTH: f32 = 0.012;

/// Maps grid cells onto the `[-1, 1]` square the camera looks at. The board
/// keeps square cells, so a non-square grid is letterboxed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    cols: i32,
    rows: i32,
    cell: f32,
}

impl BoardLayout {
    pub fn new(grid: Grid) -> Self {
        let cols = grid.cols.max(1);
        let rows = grid.rows.max(1);
        Self {
            cols,
            rows,
            cell: 2.0 / cols.max(rows) as f32,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell
    }

    pub fn width(&self) -> f32 {
        self.cols as f32 * self.cell
    }

    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell
    }

    /// Cell `(0, 0)` is the top-left corner; world `y` points up.
    pub fn cell_center(&self, pos: Position) -> (f32, f32) {
        let x = -self.width() / 2.0 + (pos.x as f32 + 0.5) * self.cell;
        let y = self.height() / 2.0 - (pos.y as f32 + 0.5) * self.cell;
        (x, y)
    }
}

/// Opacity of segment `index` in a snake of `len`: 1.0 at the head, fading
/// towards 0.4 at the tail.
pub fn segment_alpha(index: usize, len: usize) -> f32 {
    if len == 0 {
        return 1.0;
    }
    let t = 1.0 - index as f32 / len as f32;
    0.4 + t * 0.6
}

fn alpha_byte(alpha: f32) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn flat_material(context: &Context, color: Srgba) -> ColorMaterial {
    let cpu = CpuMaterial {
        albedo: color,
        ..Default::default()
    };
    if color.a < 255 {
        ColorMaterial::new_transparent(context, &cpu)
    } else {
        ColorMaterial::new_opaque(context, &cpu)
    }
}

pub struct GameRenderer {
    camera: Camera,
    layout: BoardLayout,
    grid_lines: Gm<InstancedMesh, ColorMaterial>,
    border: Gm<InstancedMesh, ColorMaterial>,
    snake_instances: Gm<InstancedMesh, ColorMaterial>,
    head_glow: Gm<Mesh, ColorMaterial>,
    food_glow: Gm<Mesh, ColorMaterial>,
    food_mesh: Gm<Mesh, ColorMaterial>,
}

impl GameRenderer {
    pub fn new(context: Context, grid: Grid) -> Self {
        let layout = BoardLayout::new(grid);
        let (w, h) = (layout.width(), layout.height());

        let camera = Camera::new_orthographic(
            Viewport::new_at_origo(1, 1),
            vec3(0.0, 0.0, 5.0),
            vec3(0.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
            2.1,
            0.1,
            10.0,
        );

        // CpuMesh::square spans [-1, 1], so scales below are half-extents.
        let beam = |x: f32, y: f32, half_w: f32, half_h: f32| {
            Mat4::from_translation(vec3(x, y, GRID_Z)) * Mat4::from_nonuniform_scale(half_w, half_h, 1.0)
        };

        let mut grid_transformations = Vec::new();
        for i in 1..grid.cols {
            let x = -w / 2.0 + i as f32 * layout.cell_size();
            grid_transformations.push(beam(x, 0.0, GRID_LINE_WIDTH / 2.0, h / 2.0));
        }
        for j in 1..grid.rows {
            let y = h / 2.0 - j as f32 * layout.cell_size();
            grid_transformations.push(beam(0.0, y, w / 2.0, GRID_LINE_WIDTH / 2.0));
        }

        let border_transformations = vec![
            beam(-w / 2.0, 0.0, BORDER_WIDTH / 2.0, h / 2.0),
            beam(w / 2.0, 0.0, BORDER_WIDTH / 2.0, h / 2.0),
            beam(0.0, h / 2.0, w / 2.0, BORDER_WIDTH / 2.0),
            beam(0.0, -h / 2.0, w / 2.0, BORDER_WIDTH / 2.0),
        ];

        let grid_lines = Gm::new(
            InstancedMesh::new(
                &context,
                &Instances {
                    transformations: grid_transformations,
                    ..Default::default()
                },
                &CpuMesh::square(),
            ),
            flat_material(&context, Srgba::new(255, 255, 255, 8)),
        );

        let border = Gm::new(
            InstancedMesh::new(
                &context,
                &Instances {
                    transformations: border_transformations,
                    ..Default::default()
                },
                &CpuMesh::square(),
            ),
            flat_material(&context, Srgba::new(SNAKE_RGB.0, SNAKE_RGB.1, SNAKE_RGB.2, 38)),
        );

        // Per-segment colors carry the fade; the material stays white.
        let snake_instances = Gm::new(
            InstancedMesh::new(&context, &Instances::default(), &CpuMesh::square()),
            ColorMaterial::new_transparent(
                &context,
                &CpuMaterial {
                    albedo: Srgba::WHITE,
                    ..Default::default()
                },
            ),
        );

        let head_glow = Gm::new(
            Mesh::new(&context, &CpuMesh::circle(32)),
            flat_material(&context, Srgba::new(SNAKE_RGB.0, SNAKE_RGB.1, SNAKE_RGB.2, 64)),
        );

        let food_glow = Gm::new(
            Mesh::new(&context, &CpuMesh::circle(32)),
            flat_material(&context, Srgba::new(FOOD_RGB.0, FOOD_RGB.1, FOOD_RGB.2, 77)),
        );

        let food_mesh = Gm::new(
            Mesh::new(&context, &CpuMesh::circle(32)),
            flat_material(&context, Srgba::new_opaque(FOOD_RGB.0, FOOD_RGB.1, FOOD_RGB.2)),
        );

        Self {
            camera,
            layout,
            grid_lines,
            border,
            snake_instances,
            head_glow,
            food_glow,
            food_mesh,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(Viewport::new_at_origo(width, height));
    }

    /// Draws `state` as-is. Nothing here feeds back into the game.
    pub fn render(&mut self, state: &GameState, target: &RenderTarget) {
        let cell = self.layout.cell_size();
        let len = state.snake.len();

        let mut transformations = Vec::with_capacity(len);
        let mut colors = Vec::with_capacity(len);
        for (i, pos) in state.snake.iter().enumerate() {
            let (x, y) = self.layout.cell_center(*pos);
            // The head is drawn slightly larger than the body.
            let inset = if i == 0 { 0.05 } else { 0.1 };
            transformations.push(
                Mat4::from_translation(vec3(x, y, SNAKE_Z)) * Mat4::from_scale(cell * (0.5 - inset)),
            );
            colors.push(Srgba::new(
                SNAKE_RGB.0,
                SNAKE_RGB.1,
                SNAKE_RGB.2,
                alpha_byte(segment_alpha(i, len)),
            ));
        }
        self.snake_instances.geometry.set_instances(&Instances {
            transformations,
            colors: Some(colors),
            ..Default::default()
        });

        if let Some(head) = state.snake.front() {
            let (x, y) = self.layout.cell_center(*head);
            self.head_glow
                .set_transformation(Mat4::from_translation(vec3(x, y, SNAKE_Z - 0.005)) * Mat4::from_scale(cell * 0.8));
        }

        if let Some(food) = state.food {
            let (x, y) = self.layout.cell_center(food);
            self.food_glow
                .set_transformation(Mat4::from_translation(vec3(x, y, FOOD_Z)) * Mat4::from_scale(cell));
            self.food_mesh.set_transformation(
                Mat4::from_translation(vec3(x, y, FOOD_Z + 0.005)) * Mat4::from_scale(cell / 2.8),
            );
        }

        target.clear(ClearState::color_and_depth(
            BACKGROUND.0,
            BACKGROUND.1,
            BACKGROUND.2,
            1.0,
            1.0,
        ));

        let mut objects: Vec<&dyn Object> = vec![&self.grid_lines, &self.border];
        if state.food.is_some() {
            objects.push(&self.food_glow);
            objects.push(&self.food_mesh);
        }
        objects.push(&self.head_glow);
        objects.push(&self.snake_instances);

        target.render(&self.camera, &objects, &[]);
    }
}
