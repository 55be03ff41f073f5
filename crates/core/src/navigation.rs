use crate::{Canvas, MinimapConfig, ScreenPoint, WorldPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkVia {
    Screen,
    Minimap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkClick {
    pub point: ScreenPoint,
    pub via: WalkVia,
}

/// Picks where to click to walk toward `target`.
///
/// A visible projection of the tile is clicked directly; otherwise the click
/// goes on the minimap, pulled in to the minimap's reliable radius.
pub fn walk_click_point(
    projection: Option<ScreenPoint>,
    canvas: &Canvas,
    player: WorldPoint,
    target: WorldPoint,
    minimap: &MinimapConfig,
) -> WalkClick {
    if let Some(point) = projection {
        if canvas.contains_point(point, minimap.screen_margin) {
            return WalkClick {
                point,
                via: WalkVia::Screen,
            };
        }
    }
    WalkClick {
        point: minimap_point(player, target, minimap),
        via: WalkVia::Minimap,
    }
}

/// Minimap click for `target`, computed in `f64` so any pair of world tiles
/// scales and clamps without overflow.
pub fn minimap_point(
    player: WorldPoint,
    target: WorldPoint,
    minimap: &MinimapConfig,
) -> ScreenPoint {
    let mut dx = f64::from(target.x) - f64::from(player.x);
    let mut dy = f64::from(target.y) - f64::from(player.y);
    let distance = dx.hypot(dy);
    let max_tiles = f64::from(minimap.max_tiles);
    if distance > max_tiles {
        let scale = max_tiles / distance;
        dx = (dx * scale).round();
        dy = (dy * scale).round();
    }
    let pixels_per_tile = f64::from(minimap.pixels_per_tile);
    let x = f64::from(minimap.center_x) + dx * pixels_per_tile;
    let y = f64::from(minimap.center_y) - dy * pixels_per_tile;
    ScreenPoint {
        x: x.max(f64::from(minimap.min_x)).min(f64::from(minimap.max_x)) as i32,
        y: y.max(f64::from(minimap.min_y)).min(f64::from(minimap.max_y)) as i32,
    }
}
