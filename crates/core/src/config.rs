//! Configuration constants for instance processing.

/// UFO format version written when none is requested.
pub const DEFAULT_UFO_VERSION: u32 = 3;

/// Name reported for a source's default layer.
pub const FOREGROUND_LAYER: &str = "foreground";

/// Name of the default layer in `layercontents.plist`.
pub const DEFAULT_LAYER_NAME: &str = "public.default";

/// Directory of the default glyph layer inside a UFO.
pub const DEFAULT_GLYPHS_DIR: &str = "glyphs";

/// UFO metadata file holding `formatVersion`.
pub const METAINFO_FILENAME: &str = "metainfo.plist";

/// Map of layer names to glyph directories (UFO 3).
pub const LAYERCONTENTS_FILENAME: &str = "layercontents.plist";

/// Map of glyph names to `.glif` files inside a glyph directory.
pub const CONTENTS_FILENAME: &str = "contents.plist";

/// Font lib key for the glyph order.
pub const GLYPH_ORDER_KEY: &str = "public.glyphOrder";

/// Font lib key storing the instance location as `(axis, value)` pairs.
pub const DESIGNSPACE_LIB_KEY: &str = "designspace";

/// Pattern used to find documents in a directory.
pub const DESIGNSPACE_PATTERN: &str = "*.designspace";
