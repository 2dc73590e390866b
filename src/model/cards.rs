use anyhow::{Result, bail};
use glam::{Vec2, Vec3};

use crate::data::carousel::CarouselItem;
use crate::data::config::HelixConfig;
use crate::error::SceneError;

/// One carousel tile, ready to spawn under the card group.
#[derive(Clone, Debug, PartialEq)]
pub struct CardBlueprint {
    pub index: usize,
    pub title: String,
    pub color: Vec3,
    /// Poster frame of the card's video, if it has one.
    pub poster: Option<String>,
    pub size: Vec2,
    /// Inset of the poster inside the coloured frame.
    pub poster_size: Vec2,
    /// Caption anchor below the card, in card-local space.
    pub caption_offset: Vec3,
}

pub fn build_cards(items: &[CarouselItem], helix: &HelixConfig) -> Result<Vec<CardBlueprint>> {
    let size = helix.card_size;
    if !(size.x > 0.0 && size.y > 0.0) {
        bail!(SceneError::Construction(format!(
            "card size must be positive, got {size}"
        )));
    }
    let border = size.min_element() * 0.05;
    Ok(items
        .iter()
        .enumerate()
        .map(|(index, item)| CardBlueprint {
            index,
            title: item.title.clone(),
            color: Vec3::from_array(item.color),
            poster: item.video.clone(),
            size,
            poster_size: size - Vec2::splat(border * 2.0),
            caption_offset: Vec3::new(0.0, -size.y * 0.5 - 0.08, 0.01),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::carousel::default_carousel;

    #[test]
    fn one_card_per_item_in_order() {
        let items = default_carousel();
        let cards = build_cards(&items, &HelixConfig::default()).unwrap();
        assert_eq!(cards.len(), items.len());
        for (i, card) in cards.iter().enumerate() {
            assert_eq!(card.index, i);
            assert_eq!(card.title, items[i].title);
            assert!(card.poster_size.x < card.size.x);
        }
    }

    #[test]
    fn degenerate_card_size_is_a_construction_error() {
        let helix = HelixConfig {
            card_size: Vec2::new(0.0, 1.0),
            ..HelixConfig::default()
        };
        let err = build_cards(&default_carousel(), &helix).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SceneError>(),
            Some(SceneError::Construction(_))
        ));
    }
}
