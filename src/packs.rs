//! 단어 팩 카탈로그

use rand::seq::SliceRandom;

/// 일반 단어와 임포스터 단어 한 쌍
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordPair {
    pub main: &'static str,
    pub imposter: &'static str,
}

/// 이름 붙은 단어 팩
#[derive(Debug)]
pub struct Pack {
    pub id: &'static str,
    pub pairs: &'static [WordPair],
}

pub const DEFAULT_PACK_ID: &str = "classic";

const fn pair(main: &'static str, imposter: &'static str) -> WordPair {
    WordPair { main, imposter }
}

static PACKS: &[Pack] = &[
    Pack {
        id: "classic",
        pairs: &[
            pair("Beach", "Desert"),
            pair("Guitar", "Violin"),
            pair("Coffee", "Tea"),
            pair("Airport", "Train station"),
            pair("Doctor", "Nurse"),
            pair("Castle", "Palace"),
            pair("Rain", "Snow"),
            pair("Camera", "Phone"),
        ],
    },
    Pack {
        id: "food",
        pairs: &[
            pair("Pizza", "Burger"),
            pair("Sushi", "Ramen"),
            pair("Pancake", "Waffle"),
            pair("Apple", "Pear"),
            pair("Ice cream", "Frozen yogurt"),
            pair("Taco", "Burrito"),
            pair("Croissant", "Bagel"),
            pair("Cheese", "Butter"),
        ],
    },
    Pack {
        id: "animals",
        pairs: &[
            pair("Lion", "Tiger"),
            pair("Dolphin", "Shark"),
            pair("Eagle", "Hawk"),
            pair("Horse", "Zebra"),
            pair("Frog", "Toad"),
            pair("Rabbit", "Hamster"),
            pair("Penguin", "Puffin"),
            pair("Crocodile", "Alligator"),
        ],
    },
    Pack {
        id: "places",
        pairs: &[
            pair("Library", "Bookstore"),
            pair("Hospital", "Pharmacy"),
            pair("Cinema", "Theater"),
            pair("Museum", "Gallery"),
            pair("Gym", "Stadium"),
            pair("Zoo", "Aquarium"),
            pair("School", "University"),
            pair("Bakery", "Cafe"),
        ],
    },
    Pack {
        id: "jobs",
        pairs: &[
            pair("Chef", "Baker"),
            pair("Pilot", "Astronaut"),
            pair("Teacher", "Professor"),
            pair("Firefighter", "Police officer"),
            pair("Farmer", "Gardener"),
            pair("Painter", "Photographer"),
            pair("Lawyer", "Judge"),
            pair("Dentist", "Surgeon"),
        ],
    },
];

/// 등록된 팩 id 목록
pub fn pack_ids() -> impl Iterator<Item = &'static str> {
    PACKS.iter().map(|pack| pack.id)
}

pub fn find_pack(id: &str) -> Option<&'static Pack> {
    let id = id.trim();
    PACKS.iter().find(|pack| pack.id.eq_ignore_ascii_case(id))
}

/// 알 수 없거나 비어 있는 팩 id는 기본 팩으로 대체
pub fn normalize_pack_id(id: Option<&str>) -> &'static str {
    id.and_then(find_pack)
        .map(|pack| pack.id)
        .unwrap_or(DEFAULT_PACK_ID)
}

/// 팩에서 단어 쌍을 균등 확률로 선택
pub fn random_pair(pack_id: &str) -> WordPair {
    let pack = find_pack(pack_id).unwrap_or(&PACKS[0]);
    *pack
        .pairs
        .choose(&mut rand::thread_rng())
        .unwrap_or(&PACKS[0].pairs[0])
}
