use battle_engine::items::ResourceSnapshot;
use battle_engine::{
    AbilityCatalog, BuffTarget, Combatant, Inventory, Item, ItemCatalog, ItemEffect, Player,
    Rejection,
};

fn hero() -> Player {
    Player::new("p1", "Hero", &AbilityCatalog::builtin(), &ItemCatalog::builtin())
}

fn potion() -> Item {
    Item::new("Healing Potion", ItemEffect::Heal { amount: 30 })
}

#[test]
fn adding_merges_by_name() {
    let mut inv = Inventory::default();
    inv.add_item(potion(), 2);
    inv.add_item(potion(), 3);
    inv.add_item(potion(), 0);
    assert_eq!(inv.len(), 1);
    assert_eq!(inv.quantity("Healing Potion"), 5);
}

#[test]
fn stack_size_saturates() {
    let mut inv = Inventory::default();
    inv.add_item(potion(), u32::MAX);
    inv.add_item(potion(), 1);
    assert_eq!(inv.quantity("Healing Potion"), u32::MAX);
}

#[test]
fn removing_too_many_leaves_inventory_untouched() {
    let mut inv = Inventory::default();
    inv.add_item(potion(), 2);
    assert!(!inv.remove_item("Healing Potion", 3));
    assert_eq!(inv.quantity("Healing Potion"), 2);
    assert!(!inv.remove_item("Chakra Pill", 1));
    assert!(inv.remove_item("Healing Potion", 2));
    assert!(inv.get("Healing Potion").is_none());
    assert!(inv.is_empty());
}

#[test]
fn inventory_loads_from_a_name_map() {
    let json = r#"{
        "Healing Potion": {"item": {"name": "Healing Potion", "effect": {"kind": "heal", "amount": 30}}, "quantity": 2},
        "Chakra Pill": {"item": {"name": "Chakra Pill", "effect": {"kind": "restore_energy", "amount": 25}}, "quantity": 0}
    }"#;
    let inv: Inventory = serde_json::from_str(json).unwrap();
    assert_eq!(inv.quantity("Healing Potion"), 2);
    assert!(inv.get("Chakra Pill").is_none());

    let mismatched = r#"{"Elixir": {"item": {"name": "Healing Potion", "effect": {"kind": "heal", "amount": 30}}, "quantity": 1}}"#;
    assert!(serde_json::from_str::<Inventory>(mismatched).is_err());
}

#[test]
fn applying_each_effect() {
    let mut p = hero();
    let catalog = ItemCatalog::builtin();
    for name in ["Soldier Pill", "Iron Skin Tonic"] {
        p.inventory_mut().add_item(catalog.get(name).cloned().unwrap(), 1);
    }
    p.health_mut().set(60);
    p.energy_mut().set(10);

    assert!(p.apply_item("Healing Potion"));
    assert!(p.apply_item("Chakra Pill"));
    assert!(p.apply_item("Soldier Pill"));
    assert!(p.apply_item("Iron Skin Tonic"));
    assert!(!p.apply_item("Soldier Pill"));

    assert_eq!(p.health().current(), 90);
    assert_eq!(p.energy().current(), 35);
    assert_eq!(p.power_buff(), 5);
    assert_eq!(p.resilience_buff(), 5);
    assert_eq!(p.inventory().quantity("Healing Potion"), 2);
    assert_eq!(p.inventory().quantity("Chakra Pill"), 1);
}

#[test]
fn change_description_mentions_only_what_moved() {
    let mut p = hero();
    p.health_mut().set(90);
    let before = ResourceSnapshot::of(&p);
    p.heal(30);
    p.add_buff(BuffTarget::Power, 5);
    let after = ResourceSnapshot::of(&p);
    assert_eq!(
        before.describe_change(&after).as_deref(),
        Some("restored 10 HP, gained 5 power")
    );
    assert_eq!(after.describe_change(&after), None);
}

#[test]
fn menu_use_outside_battle() {
    let mut p = hero();
    p.health_mut().set(40);
    let message = p.use_item_outside_battle("Healing Potion").unwrap();
    assert_eq!(message, "Used Healing Potion: restored 30 HP");
    assert_eq!(p.health().current(), 70);

    let full = p.use_item_outside_battle("Chakra Pill").unwrap();
    assert_eq!(full, "Used Chakra Pill, but nothing happened");
    assert_eq!(p.inventory().quantity("Chakra Pill"), 1);

    assert_eq!(
        p.use_item_outside_battle("Soldier Pill"),
        Err(Rejection::ItemNotHeld("Soldier Pill".into()))
    );
}

#[test]
fn battle_only_items_are_refused_in_the_field() {
    let mut p = hero();
    let mut flash = Item::new("Flash Bomb", ItemEffect::Buff { target: BuffTarget::Power, amount: 3 });
    flash.usable_outside_battle = false;
    p.inventory_mut().add_item(flash, 1);
    assert_eq!(
        p.use_item_outside_battle("Flash Bomb"),
        Err(Rejection::ItemNotUsableOutsideBattle("Flash Bomb".into()))
    );
    assert_eq!(p.inventory().quantity("Flash Bomb"), 1);
}

#[test]
fn catalog_from_yaml_rejects_bad_tables() {
    let ok = r#"
- name: Elixir
  effect: { kind: heal, amount: 200 }
  usable_in_battle: false
"#;
    let catalog = ItemCatalog::from_yaml(ok).unwrap();
    let elixir = catalog.get("Elixir").unwrap();
    assert!(!elixir.usable_in_battle);
    assert!(elixir.usable_outside_battle);

    let dup = r#"
- { name: Elixir, effect: { kind: heal, amount: 1 } }
- { name: Elixir, effect: { kind: heal, amount: 2 } }
"#;
    assert!(ItemCatalog::from_yaml(dup).is_err());

    let negative = "- { name: Poison, effect: { kind: heal, amount: -5 } }";
    assert!(ItemCatalog::from_yaml(negative).is_err());
}
