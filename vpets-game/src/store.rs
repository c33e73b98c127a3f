//! Shop: price listings and purchases against a player's balance.
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogKind};
use crate::error::GameError;
use crate::player::Player;

/// Something the shop sells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ShopItem {
    Food(String),
    Toy(String),
}

impl ShopItem {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Food(name) | Self::Toy(name) => name,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> CatalogKind {
        match self {
            Self::Food(_) => CatalogKind::Food,
            Self::Toy(_) => CatalogKind::Toy,
        }
    }
}

/// One row of the shop screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopListing {
    pub item: ShopItem,
    pub price: i64,
    pub affordable: bool,
}

/// Every food and toy in the catalog with its price, foods first.
#[must_use]
pub fn shop_listings(catalog: &Catalog, money: i64) -> Vec<ShopListing> {
    let foods = catalog.food_types.iter().map(|food| ShopListing {
        item: ShopItem::Food(food.name.clone()),
        price: food.price,
        affordable: food.price <= money,
    });
    let toys = catalog.toy_types.iter().map(|toy| ShopListing {
        item: ShopItem::Toy(toy.name.clone()),
        price: toy.price,
        affordable: toy.price <= money,
    });
    foods.chain(toys).collect()
}

/// Price of `item`, if the catalog sells it.
#[must_use]
pub fn price_of(catalog: &Catalog, item: &ShopItem) -> Option<i64> {
    match item {
        ShopItem::Food(name) => catalog.food(name).map(|food| food.price),
        ShopItem::Toy(name) => catalog.toy(name).map(|toy| toy.price),
    }
}

/// Buy `item` for `player`. Nothing changes on failure.
///
/// # Errors
///
/// Returns [`GameError::UnknownFood`] / [`GameError::UnknownToy`] for items
/// outside the catalog and [`GameError::InsufficientFunds`] when the balance
/// is short.
pub fn purchase(catalog: &Catalog, player: &mut Player, item: &ShopItem) -> Result<(), GameError> {
    match item {
        ShopItem::Food(name) => {
            let food = catalog
                .food(name)
                .ok_or_else(|| GameError::UnknownFood(name.clone()))?;
            player.buy_food(food)
        }
        ShopItem::Toy(name) => {
            let toy = catalog
                .toy(name)
                .ok_or_else(|| GameError::UnknownToy(name.clone()))?;
            player.buy_toy(toy)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pet::Pet;
    use smallvec::smallvec;

    fn player(money: i64) -> Player {
        let catalog = Catalog::default_catalog();
        let cat = catalog.species("Cat").cloned().unwrap();
        Player::new(1, "Alice", smallvec![Pet::new(1, "Tom", cat, None, None)], money)
    }

    #[test]
    fn listings_flag_affordability() {
        let catalog = Catalog::default_catalog();
        let listings = shop_listings(catalog, 10);
        assert_eq!(
            listings.len(),
            catalog.food_types.len() + catalog.toy_types.len()
        );
        for listing in &listings {
            assert_eq!(listing.affordable, listing.price <= 10);
            assert_eq!(price_of(catalog, &listing.item), Some(listing.price));
        }
        assert_eq!(listings[0].item.kind(), CatalogKind::Food);
    }

    #[test]
    fn purchases_respect_balance() {
        let catalog = Catalog::default_catalog();
        let mut player = player(10);
        purchase(catalog, &mut player, &ShopItem::Food(String::from("Kibble"))).unwrap();
        assert_eq!(player.money, 5);
        assert_eq!(player.food_count("Kibble"), 1);

        let err = purchase(catalog, &mut player, &ShopItem::Toy(String::from("Ball"))).unwrap_err();
        assert!(matches!(err, GameError::InsufficientFunds { needed: 10, .. }));
        assert!(player.toys().is_empty());

        let err = purchase(catalog, &mut player, &ShopItem::Food(String::from("Caviar")))
            .unwrap_err();
        assert_eq!(err, GameError::UnknownFood(String::from("Caviar")));
        assert_eq!(player.money, 5);
    }
}
