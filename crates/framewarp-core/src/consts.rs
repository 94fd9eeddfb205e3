/// Maximum number of perspective matrices per transform (one per frame
/// sub-region, 3x3 grid of regions).
pub const MAX_PERSPECTIVE_MATRICES: usize = 9;

/// Parameters per perspective matrix (row-major 3x3 projective transform).
pub const PERSPECTIVE_MATRIX_PARAMS: usize = 9;

/// Extrapolated corner samples carried alongside a deformation grid.
pub const GRID_EXTRAPOLATE_CORNERS: usize = 4;

/// Assist grid resolution. All call sites derive coarse grids at 16x16.
pub const ASSIST_GRID_ROWS: u32 = 16;
pub const ASSIST_GRID_COLUMNS: u32 = 16;

/// Largest supported deformation-grid geometry (rows x columns). Grid
/// sample storage is allocated once at this size and windowed logically.
pub const MAX_GRID_ROWS: usize = 51;
pub const MAX_GRID_COLUMNS: usize = 67;

/// Compact deformation-grid geometry, used by the motion-coprocessor path.
pub const COMPACT_GRID_ROWS: usize = 27;
pub const COMPACT_GRID_COLUMNS: usize = 35;

/// Entries per output-interpolation coefficient table.
pub const INTERPOLATION_LUT_ENTRIES: usize = 16;

/// Number of output-interpolation coefficient tables.
pub const INTERPOLATION_LUT_SETS: usize = 3;

/// Logical optical-center maximum in 15uQ14 fixed point: 0 is the start
/// of the image, this value is the end.
pub const OPTICAL_CENTER_LOGICAL_MAX: f32 = 16384.0;

/// Maximum number of detected faces carried through geometry resolution.
pub const MAX_FACES: usize = 10;
