//! TOML scenario files describing the map shown by the CLI.

use std::{fs, io, path::Path, path::PathBuf};

use serde::Deserialize;
use tactical_core::{
    CellIndex, Command, GridBounds, OccupantId, OverlayKind, OverlayRef, TerrainRef, Theater,
    GRID_HEIGHT, GRID_WIDTH,
};
use tactical_rendering::ViewportConfig;
use tactical_system_scrolling::Config as ScrollConfig;
use thiserror::Error;

/// Scenario format version understood by this build.
pub(crate) const SUPPORTED_SCENARIO_VERSION: u32 = 1;

/// Failures raised while loading a scenario file.
#[derive(Debug, Error)]
pub(crate) enum ScenarioError {
    #[error("failed to read scenario file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse scenario toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unsupported scenario version {found}; expected {}", SUPPORTED_SCENARIO_VERSION)]
    UnsupportedVersion { found: u32 },
    #[error("play area {width}x{height} is empty")]
    EmptyBounds { width: i32, height: i32 },
    #[error("cell ({x}, {y}) lies outside the {}x{} grid", GRID_WIDTH, GRID_HEIGHT)]
    CellOutsideGrid { x: i32, y: i32 },
    #[error(
        "region at ({x}, {y}) sized {width}x{height} does not fit the {}x{} grid",
        GRID_WIDTH,
        GRID_HEIGHT
    )]
    RegionOutsideGrid {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
}

/// Rectangle of cells sharing one terrain template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct Region {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: i32,
    pub(crate) height: i32,
    #[serde(default)]
    pub(crate) template: u8,
    /// Whether the region starts in view rather than merely explored.
    #[serde(default = "default_true")]
    pub(crate) visible: bool,
}

impl Region {
    /// Reports whether the region is non-empty and lies wholly on the grid.
    fn fits_grid(&self) -> bool {
        let axis = |start: i32, extent: i32, limit: i32| {
            (0..limit).contains(&start) && (1..=limit - start).contains(&extent)
        };
        axis(self.x, self.width, GRID_WIDTH) && axis(self.y, self.height, GRID_HEIGHT)
    }
}

/// Overlay placed on a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct Placement {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) kind: OverlayKind,
    #[serde(default)]
    pub(crate) aux: u8,
}

/// Occupant placed on a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct Occupant {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) id: u32,
}

/// Everything needed to build and frame the map.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScenarioConfig {
    pub(crate) version: u32,
    #[serde(default)]
    pub(crate) theater: Theater,
    #[serde(default)]
    pub(crate) bounds: GridBounds,
    /// Cell the view is centred on after loading.
    #[serde(default)]
    pub(crate) center: Option<(i32, i32)>,
    #[serde(default)]
    pub(crate) viewport: ViewportConfig,
    #[serde(default)]
    pub(crate) scrolling: ScrollConfig,
    #[serde(default)]
    pub(crate) regions: Vec<Region>,
    #[serde(default)]
    pub(crate) overlays: Vec<Placement>,
    #[serde(default)]
    pub(crate) occupants: Vec<Occupant>,
}

fn default_true() -> bool {
    true
}

impl ScenarioConfig {
    /// Built-in map used when no scenario file is given.
    pub(crate) fn demo() -> Self {
        Self {
            version: SUPPORTED_SCENARIO_VERSION,
            theater: Theater::Temperate,
            bounds: GridBounds::new(20, 20, 40, 20),
            center: Some((40, 30)),
            viewport: ViewportConfig::CLASSIC,
            scrolling: ScrollConfig::CLASSIC,
            regions: vec![
                Region {
                    x: 20,
                    y: 20,
                    width: 40,
                    height: 14,
                    template: 0,
                    visible: true,
                },
                Region {
                    x: 44,
                    y: 24,
                    width: 6,
                    height: 3,
                    template: 3,
                    visible: true,
                },
                Region {
                    x: 20,
                    y: 34,
                    width: 40,
                    height: 6,
                    template: 30,
                    visible: false,
                },
            ],
            overlays: vec![
                Placement {
                    x: 36,
                    y: 28,
                    kind: OverlayKind::Gold3,
                    aux: 6,
                },
                Placement {
                    x: 37,
                    y: 28,
                    kind: OverlayKind::Gems1,
                    aux: 2,
                },
                Placement {
                    x: 30,
                    y: 22,
                    kind: OverlayKind::Brick,
                    aux: 0,
                },
            ],
            occupants: vec![Occupant {
                x: 40,
                y: 30,
                id: 1,
            }],
        }
    }

    /// Reads and validates a scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self, ScenarioError> {
        let contents = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parses and validates scenario TOML.
    pub(crate) fn parse(contents: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = toml::from_str(contents)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if self.version != SUPPORTED_SCENARIO_VERSION {
            return Err(ScenarioError::UnsupportedVersion {
                found: self.version,
            });
        }
        if self.bounds.width() <= 0 || self.bounds.height() <= 0 {
            return Err(ScenarioError::EmptyBounds {
                width: self.bounds.width(),
                height: self.bounds.height(),
            });
        }
        if let Some(region) = self.regions.iter().find(|region| !region.fits_grid()) {
            return Err(ScenarioError::RegionOutsideGrid {
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
            });
        }
        let cells = self
            .overlays
            .iter()
            .map(|overlay| (overlay.x, overlay.y))
            .chain(self.occupants.iter().map(|occupant| (occupant.x, occupant.y)))
            .chain(self.center);
        for (x, y) in cells {
            if CellIndex::from_xy(x, y).is_none() {
                return Err(ScenarioError::CellOutsideGrid { x, y });
            }
        }
        Ok(())
    }

    /// World commands that load the scenario into a fresh grid.
    pub(crate) fn commands(&self) -> Vec<Command> {
        let mut commands = vec![
            Command::ResetGrid {
                theater: self.theater,
            },
            Command::SetBounds {
                bounds: self.bounds,
            },
        ];

        for region in &self.regions {
            for y in region.y..region.y + region.height {
                for x in region.x..region.x + region.width {
                    let cell = CellIndex::from_xy(x, y);
                    commands.push(Command::SetTerrain {
                        cell,
                        terrain: Some(TerrainRef::new(region.template, 0)),
                    });
                    commands.push(Command::RevealCell {
                        cell,
                        make_visible: region.visible,
                    });
                }
            }
        }

        commands.extend(self.overlays.iter().map(|overlay| Command::SetOverlay {
            cell: CellIndex::from_xy(overlay.x, overlay.y),
            overlay: Some(OverlayRef::new(overlay.kind, overlay.aux)),
        }));
        commands.extend(self.occupants.iter().map(|occupant| Command::PlaceOccupant {
            cell: CellIndex::from_xy(occupant.x, occupant.y),
            occupant: OccupantId::new(occupant.id),
        }));
        commands
    }
}
