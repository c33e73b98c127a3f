use std::collections::HashSet;

use vpets_game::{Catalog, CatalogKind, MergeReport};

const SPECIES: &str = include_str!("../assets/data/species.json");
const FOODS: &str = include_str!("../assets/data/foods.json");
const TOYS: &str = include_str!("../assets/data/toys.json");

#[test]
fn bundled_assets_parse_without_duplicates() {
    let catalog = Catalog::from_json_parts(SPECIES, FOODS, TOYS).unwrap();
    let raw_species: Vec<serde_json::Value> = serde_json::from_str(SPECIES).unwrap();
    assert_eq!(catalog.species.len(), raw_species.len());
    assert_eq!(&catalog, Catalog::default_catalog());

    for species in catalog.species.iter() {
        assert!((1..=60).contains(&species.optimum_weight), "{}", species.name);
        assert!(!species.icon.is_empty(), "{} has no icon", species.name);
        let (low, high) = species.weight_band();
        assert!(low <= species.optimum_weight && species.optimum_weight <= high);
    }
    for toy in catalog.toy_types.iter() {
        assert!(toy.durability >= 1);
        assert!(toy.price >= 0);
    }
}

#[test]
fn fingerprint_is_stable_and_content_sensitive() {
    let catalog = Catalog::load_from_static();
    assert_eq!(catalog.fingerprint(), Catalog::load_from_static().fingerprint());

    let mut edited = catalog.clone();
    let mut cat = edited.species("Cat").cloned().unwrap();
    cat.name = String::from("Lynx");
    edited.species.insert_if_absent(cat);
    assert_ne!(edited.fingerprint(), catalog.fingerprint());
}

#[test]
fn merging_a_catalog_into_itself_discards_everything() {
    let mut catalog = Catalog::load_from_static();
    let before = catalog.clone();
    let MergeReport { added, discarded } = catalog.merge(before.clone());
    assert!(added.is_empty());
    assert_eq!(
        discarded.len(),
        before.species.len() + before.food_types.len() + before.toy_types.len()
    );
    assert_eq!(catalog, before);
    let kinds: HashSet<CatalogKind> = discarded.iter().map(|entry| entry.kind).collect();
    assert_eq!(kinds.len(), 3);
}

#[test]
fn exported_assets_reload_into_the_same_catalog() {
    let catalog = Catalog::load_from_static();
    let parts = catalog.to_json_parts().unwrap();
    let reloaded = Catalog::from_json_parts(&parts.species, &parts.foods, &parts.toys).unwrap();
    assert_eq!(reloaded, catalog);
}
