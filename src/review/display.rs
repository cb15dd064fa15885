/// App Store screenshot size presets
///
/// Each preset is an App Store Connect display type with the pixel sizes it
/// accepts. Phone, tablet and watch presets accept both orientations.
use std::collections::BTreeSet;

struct DisplayPreset {
    name: &'static str,
    sizes: &'static [(u32, u32)],
    rotatable: bool,
}

const PRESETS: &[DisplayPreset] = &[
    DisplayPreset {
        name: "APP_IPHONE_69",
        sizes: &[(1320, 2868), (1290, 2796), (1260, 2736)],
        rotatable: true,
    },
    DisplayPreset {
        name: "APP_IPHONE_67",
        sizes: &[(1290, 2796), (1284, 2778)],
        rotatable: true,
    },
    DisplayPreset {
        name: "APP_IPHONE_65",
        sizes: &[(1242, 2688), (1284, 2778)],
        rotatable: true,
    },
    DisplayPreset {
        name: "APP_IPHONE_63",
        sizes: &[(1206, 2622), (1179, 2556)],
        rotatable: true,
    },
    DisplayPreset {
        name: "APP_IPHONE_61",
        sizes: &[(1179, 2556), (1170, 2532), (1080, 2340)],
        rotatable: true,
    },
    DisplayPreset {
        name: "APP_IPHONE_58",
        sizes: &[(1125, 2436), (1170, 2532), (1080, 2340)],
        rotatable: true,
    },
    DisplayPreset {
        name: "APP_IPHONE_55",
        sizes: &[(1242, 2208)],
        rotatable: true,
    },
    DisplayPreset {
        name: "APP_IPHONE_47",
        sizes: &[(750, 1334)],
        rotatable: true,
    },
    DisplayPreset {
        name: "APP_IPHONE_40",
        sizes: &[(640, 1136), (640, 1096)],
        rotatable: true,
    },
    DisplayPreset {
        name: "APP_IPHONE_35",
        sizes: &[(640, 960), (640, 920)],
        rotatable: true,
    },
    DisplayPreset {
        name: "APP_IPAD_PRO_3GEN_129",
        sizes: &[(2064, 2752), (2048, 2732)],
        rotatable: true,
    },
    DisplayPreset {
        name: "APP_IPAD_PRO_3GEN_11",
        sizes: &[(1668, 2420), (1668, 2388), (1640, 2360), (1488, 2266)],
        rotatable: true,
    },
    DisplayPreset {
        name: "APP_IPAD_PRO_129",
        sizes: &[(2048, 2732)],
        rotatable: true,
    },
    DisplayPreset {
        name: "APP_IPAD_105",
        sizes: &[(1668, 2224)],
        rotatable: true,
    },
    DisplayPreset {
        name: "APP_IPAD_97",
        sizes: &[(1536, 2048), (768, 1024)],
        rotatable: true,
    },
    DisplayPreset {
        name: "APP_DESKTOP",
        sizes: &[(1280, 800), (1440, 900), (2560, 1600), (2880, 1800)],
        rotatable: false,
    },
    DisplayPreset {
        name: "APP_APPLE_TV",
        sizes: &[(1920, 1080), (3840, 2160)],
        rotatable: false,
    },
    DisplayPreset {
        name: "APP_APPLE_VISION_PRO",
        sizes: &[(3840, 2160)],
        rotatable: false,
    },
    DisplayPreset {
        name: "APP_WATCH_ULTRA",
        sizes: &[(422, 514), (410, 502)],
        rotatable: false,
    },
    DisplayPreset {
        name: "APP_WATCH_SERIES_10",
        sizes: &[(416, 496)],
        rotatable: false,
    },
    DisplayPreset {
        name: "APP_WATCH_SERIES_7",
        sizes: &[(396, 484)],
        rotatable: false,
    },
    DisplayPreset {
        name: "APP_WATCH_SERIES_4",
        sizes: &[(368, 448)],
        rotatable: false,
    },
    DisplayPreset {
        name: "APP_WATCH_SERIES_3",
        sizes: &[(312, 390)],
        rotatable: false,
    },
];

impl DisplayPreset {
    fn accepts(&self, width: u32, height: u32) -> bool {
        self.sizes.iter().any(|&(w, h)| {
            (w, h) == (width, height) || (self.rotatable && (h, w) == (width, height))
        })
    }
}

/// Names of every preset that accepts an image of exactly this size.
pub fn display_types_for(width: u32, height: u32) -> BTreeSet<String> {
    PRESETS
        .iter()
        .filter(|preset| preset.accepts(width, height))
        .map(|preset| preset.name.to_string())
        .collect()
}
