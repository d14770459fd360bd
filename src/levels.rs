//! Built-in level catalog, three levels per difficulty tier.
use crate::config::Difficulty;
use log::warn;

pub const EASY_LEVELS: [&[&str]; 3] = [
    &[
        "####",
        "# .#",
        "#  ###",
        "#*@  #",
        "#  $ #",
        "#  ###",
        "####",
    ],
    &[
        "######",
        "#    #",
        "# #@ #",
        "# $* #",
        "# .* #",
        "#    #",
        "######",
    ],
    &[
        "  ####",
        "###  ####",
        "#     $ #",
        "# #  #$ #",
        "# . .#@ #",
        "#########",
    ],
];

pub const MEDIUM_LEVELS: [&[&str]; 3] = [
    &[
        "########",
        "#      #",
        "# .**$@#",
        "#      #",
        "#####  #",
        "    ####",
    ],
    &[
        " #######",
        " #     #",
        " # .$. #",
        "## $@$ #",
        "#  .$. #",
        "#      #",
        "########",
    ],
    &[
        "###### #####",
        "#    ###   #",
        "# $$     #@#",
        "# $ #...   #",
        "#   ########",
        "#####",
    ],
];

pub const HARD_LEVELS: [&[&str]; 3] = [
    &[
        "#######",
        "#     #",
        "# . . #",
        "# $.$ #",
        "# .$  #",
        "# $.$ #",
        "#  @  #",
        "#######",
    ],
    &[
        "  ######",
        "  # ..@#",
        "  # $$ #",
        "  ## ###",
        "   # #",
        "   # #",
        "#### #",
        "#    ##",
        "# #   #",
        "#   # #",
        "###   #",
        "  #####",
    ],
    &[
        "#####",
        "#.  ##",
        "#@$$ #",
        "##   #",
        " ##  #",
        "  ##.#",
        "   ###",
    ],
];

/// All levels of one difficulty tier.
pub fn levels_for(difficulty: Difficulty) -> &'static [&'static [&'static str]] {
    match difficulty {
        Difficulty::Easy => &EASY_LEVELS,
        Difficulty::Medium => &MEDIUM_LEVELS,
        Difficulty::Hard => &HARD_LEVELS,
    }
}

/// Returns the rows of level `index` in the `difficulty` tier.
///
/// An out-of-range index falls back to the first level of the tier.
pub fn get_level(difficulty: Difficulty, index: usize) -> &'static [&'static str] {
    let levels = levels_for(difficulty);
    match levels.get(index) {
        Some(&level) => level,
        None => {
            warn!("Level index {} out of range, using 0", index);
            levels[0]
        }
    }
}
