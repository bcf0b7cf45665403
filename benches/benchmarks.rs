criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        solving_single_monster_large_inventory,
        running_greedy_pass_over_five_monsters,
        running_multi_pass_refine_over_five_monsters,
}

fn solving_single_monster_large_inventory(c: &mut criterion::Criterion) {
    let account = synthetic_account(1, 600);
    let request = synthetic_request(&account, false);
    c.bench_function("cp::solve_monster over a 600-rune inventory", |b| {
        b.iter(|| rune_optimizer::greedy::run(&account, &request, rune_optimizer::greedy::RunHooks::default()))
    });
}

fn running_greedy_pass_over_five_monsters(c: &mut criterion::Criterion) {
    let account = synthetic_account(5, 200);
    let request = synthetic_request(&account, false);
    c.bench_function("greedy single pass over 5 monsters", |b| {
        b.iter(|| rune_optimizer::greedy::run(&account, &request, rune_optimizer::greedy::RunHooks::default()))
    });
}

fn running_multi_pass_refine_over_five_monsters(c: &mut criterion::Criterion) {
    let account = synthetic_account(5, 200);
    let request = synthetic_request(&account, true);
    c.bench_function("greedy multi-pass refine over 5 monsters", |b| {
        b.iter(|| rune_optimizer::greedy::run(&account, &request, rune_optimizer::greedy::RunHooks::default()))
    });
}

fn synthetic_account(monster_count: u32, runes_per_monster: u32) -> rune_optimizer::domain::AccountData {
    use rune_optimizer::domain::{
        Archetype, Attribute, BaseStats, Effect, EffectId, Monster, MonsterId, Occupant, QualityClass, Rune, RuneId, SetId, Slot,
    };

    let mut monsters = std::collections::BTreeMap::new();
    let mut runes = Vec::new();
    let mut next_rune_id = 1u32;

    for m in 0..monster_count {
        let unit_id = MonsterId(m + 1);
        monsters.insert(
            unit_id,
            Monster {
                id: unit_id,
                master_id: 10000 + m,
                attribute: Attribute::Fire,
                class: 6,
                stars: 6,
                base: BaseStats { con: 900, atk: 600, def: 500, spd: 101, cr: 15, cd: 50, res: 15, acc: 0 },
                archetype: Archetype::Attack,
            },
        );

        for slot_n in 1..=6u8 {
            for i in 0..runes_per_monster / 6 {
                let id = RuneId(next_rune_id);
                next_rune_id += 1;
                runes.push(Rune {
                    rune_id: id,
                    slot_no: Slot::new(slot_n).unwrap(),
                    set_id: if i % 3 == 0 { SetId::Swift } else { SetId::Violent },
                    quality_class: QualityClass::Legend,
                    rank: 6,
                    upgrade_level: 15,
                    main_effect: Effect { effect_id: EffectId(8), value: (i % 30) as i32 },
                    prefix_effect: None,
                    sub_effects: vec![],
                    occupant: Occupant::Nobody,
                });
            }
        }
    }

    rune_optimizer::domain::AccountData { monsters, runes, artifacts: Vec::new(), ..Default::default() }
}

fn synthetic_request(account: &rune_optimizer::domain::AccountData, multi_pass: bool) -> rune_optimizer::api::OptimizerRequest {
    use rune_optimizer::domain::Build;

    let unit_ids_in_order: Vec<_> = account.monsters.keys().copied().collect();
    let mut builds_by_unit = std::collections::BTreeMap::new();
    for &unit_id in &unit_ids_in_order {
        builds_by_unit.insert(unit_id, vec![Build { name: "speed".into(), priority: 1, ..Default::default() }]);
    }

    rune_optimizer::api::OptimizerRequest {
        unit_ids_in_order,
        builds_by_unit,
        time_limit_per_unit_s: 5.0,
        workers: 1,
        multi_pass_enabled: multi_pass,
        multi_pass_count: if multi_pass { 3 } else { 1 },
        rune_top_per_set: 40,
        ..Default::default()
    }
}
