//! Static category catalogue shown on the storefront and in the post-ad
//! form.

/// A top-level category and its sub-categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub icon: &'static str,
    pub subcategories: &'static [&'static str],
}

pub const CATEGORIES: &[Category] = &[
    Category {
        name: "Vehicles",
        icon: "🚗",
        subcategories: &[
            "Cars",
            "Motorbikes",
            "Three Wheelers",
            "Bicycles",
            "Vans",
            "Buses & Lorries",
            "Heavy Machinery",
            "Auto Parts",
        ],
    },
    Category {
        name: "Property",
        icon: "🏠",
        subcategories: &[
            "Land",
            "Houses For Sale",
            "House Rentals",
            "Apartments",
            "Commercial Property",
        ],
    },
    Category {
        name: "Electronics",
        icon: "📱",
        subcategories: &[
            "Mobile Phones",
            "Computers & Tablets",
            "TVs",
            "Cameras",
            "Audio & MP3",
            "Video Games",
        ],
    },
    Category {
        name: "Home & Garden",
        icon: "🏡",
        subcategories: &[
            "Furniture",
            "Home Appliances",
            "Garden",
            "Home Decor",
            "Kitchen Items",
        ],
    },
    Category {
        name: "Fashion & Beauty",
        icon: "👗",
        subcategories: &["Clothing", "Shoes", "Jewelry", "Watches", "Beauty Products"],
    },
    Category {
        name: "Animals",
        icon: "🐕",
        subcategories: &["Pets", "Pet Food", "Farm Animals"],
    },
    Category {
        name: "Hobby, Sport & Kids",
        icon: "⚽",
        subcategories: &[
            "Musical Instruments",
            "Sports & Fitness",
            "Children's Items",
            "Books",
        ],
    },
    Category {
        name: "Business & Industry",
        icon: "💼",
        subcategories: &["Services", "Equipment", "Office Supplies"],
    },
    Category {
        name: "Education",
        icon: "📚",
        subcategories: &["Higher Education", "Textbooks", "Tuition"],
    },
    Category {
        name: "Agriculture",
        icon: "🌾",
        subcategories: &["Food", "Crops", "Seeds & Plants"],
    },
];

/// Look up a category by exact name.
pub fn find(name: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.name == name)
}

/// True when `sub_category` is listed under `category`.
pub fn contains(category: &str, sub_category: &str) -> bool {
    find(category).is_some_and(|c| c.subcategories.contains(&sub_category))
}
