//! Cargo and upgrade lists, written the same way in snapshots and in client
//! requests.

use fathom_serde::{BitReader, BitWrite, Serde, UnsignedInteger};
use log::warn;

use crate::{
    messages::{
        error::CampaignCodecError, read_count, write_u16_count, write_u8_count, MAX_ITEM_QUANTITY,
        MIN_STRING_BITS,
    },
    prefab::PrefabLookup,
    state::{PendingUpgrade, PurchasedItem, SoldItem},
};

const QUANTITY_BITS: u32 = 7;

pub(crate) fn write_purchased_items(
    items: &[PurchasedItem],
    list: &'static str,
    writer: &mut dyn BitWrite,
) {
    let count = write_u16_count(items.len(), list, writer);
    for item in items.iter().take(count) {
        item.identifier.ser(writer);
        UnsignedInteger::<7>::new(item.quantity.min(MAX_ITEM_QUANTITY)).ser(writer);
    }
}

pub(crate) fn read_purchased_items(
    reader: &mut BitReader,
    list: &'static str,
    prefabs: &dyn PrefabLookup,
) -> Result<Vec<PurchasedItem>, CampaignCodecError> {
    let count = read_count::<u16>(reader, list, MIN_STRING_BITS + QUANTITY_BITS)?;
    let mut items = Vec::new();
    for _ in 0..count {
        let identifier = String::de(reader)?;
        // a 7-bit field can hold up to 127
        let quantity = UnsignedInteger::<7>::de(reader)?
            .get()
            .min(u64::from(MAX_ITEM_QUANTITY)) as u8;
        if prefabs.item(&identifier).is_none() {
            warn!("{list}: unknown item \"{identifier}\", skipping");
            continue;
        }
        items.push(PurchasedItem {
            identifier,
            quantity,
        });
    }
    Ok(items)
}

pub(crate) fn write_sold_items(items: &[SoldItem], writer: &mut dyn BitWrite) {
    let count = write_u16_count(items.len(), "sold items", writer);
    for item in items.iter().take(count) {
        item.identifier.ser(writer);
        item.id.ser(writer);
        item.removed.ser(writer);
        item.seller_id.ser(writer);
    }
}

pub(crate) fn read_sold_items(
    reader: &mut BitReader,
    prefabs: &dyn PrefabLookup,
) -> Result<Vec<SoldItem>, CampaignCodecError> {
    let count = read_count::<u16>(reader, "sold items", MIN_STRING_BITS + 16 + 1 + 8)?;
    let mut items = Vec::new();
    for _ in 0..count {
        let identifier = String::de(reader)?;
        let id = u16::de(reader)?;
        let removed = bool::de(reader)?;
        let seller_id = u8::de(reader)?;
        if prefabs.item(&identifier).is_none() {
            warn!("sold items: unknown item \"{identifier}\", skipping");
            continue;
        }
        items.push(SoldItem {
            identifier,
            id,
            removed,
            seller_id,
        });
    }
    Ok(items)
}

pub(crate) fn write_upgrades(upgrades: &[PendingUpgrade], writer: &mut dyn BitWrite) {
    let count = write_u8_count(upgrades.len(), "upgrades", writer);
    for upgrade in upgrades.iter().take(count) {
        upgrade.upgrade.ser(writer);
        upgrade.category.ser(writer);
        upgrade.level.ser(writer);
    }
}

pub(crate) fn read_upgrades(
    reader: &mut BitReader,
    prefabs: &dyn PrefabLookup,
) -> Result<Vec<PendingUpgrade>, CampaignCodecError> {
    let count = read_count::<u8>(reader, "upgrades", 2 * MIN_STRING_BITS + 8)?;
    let mut upgrades = Vec::new();
    for _ in 0..count {
        let upgrade = String::de(reader)?;
        let category = String::de(reader)?;
        let level = u8::de(reader)?;
        if prefabs.upgrade(&upgrade).is_none() || !prefabs.has_upgrade_category(&category) {
            warn!("upgrades: unknown upgrade \"{upgrade}\" in category \"{category}\", skipping");
            continue;
        }
        upgrades.push(PendingUpgrade {
            upgrade,
            category,
            level,
        });
    }
    Ok(upgrades)
}
