mod common;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axm_nullables::{BankCall, MeteredStore};
use axm_referral::activity::set_active;
use axm_referral::{
    BunchUpdater, HookRegistry, MsgRegisterReferral, MsgUpdateParams, Params, Querier, QueryError,
    RefStakingHooks, ReferralError, ReferralHook, ReferralNotice, Status, StatusReader,
};
use axm_store::{BranchStore, KvStore, MemStore};
use axm_types::{Coin, Fraction, Timestamp};

use common::{acc, Harness, DENOM, ONE_ACTIVE_STAKE};

#[test]
fn staking_child_activates_it_and_updates_parent() {
    let h = Harness::new();
    h.root("a");
    h.child("a", "b");

    h.stake("b", ONE_ACTIVE_STAKE);

    let b = h.record("b");
    assert!(b.active);
    assert_eq!(b.active_ref_counts[0], 1);
    assert_eq!(b.self_delegated, 100_000_000);
    assert_eq!(b.status, Status::Starter);

    let a = h.record("a");
    assert_eq!(a.active_count.first_line, 1);
    assert_eq!(a.active_count.team0, 1);
    assert_eq!(a.active_ref_counts[1], 1);
    assert_eq!(a.team_delegated, 100_000_000);
    assert!(!a.active);
    assert_eq!(a.status, Status::New);
}

#[test]
fn activity_toggle_is_idempotent() {
    let h = Harness::new();
    h.root("a");
    h.child("a", "b");
    h.stake("b", ONE_ACTIVE_STAKE);
    let before = (h.record("a"), h.record("b"));

    // more stake keeps the flag, direct re-activation is a no-op
    h.stake("b", 5);
    let ctx = h.ctx();
    let mut bu = BunchUpdater::new(&h.keeper, &ctx);
    set_active(&mut bu, &acc("b"), true, true).unwrap();
    bu.commit().unwrap();

    let (a, b) = (h.record("a"), h.record("b"));
    assert_eq!(a.active_count, before.0.active_count);
    assert_eq!(a.active_ref_counts, before.0.active_ref_counts);
    assert_eq!(b.active_ref_counts, before.1.active_ref_counts);

    h.stake("b", -ONE_ACTIVE_STAKE);
    let (a, b) = (h.record("a"), h.record("b"));
    assert!(!b.active);
    assert_eq!(b.self_delegated, 5);
    assert_eq!(a.active_count.first_line, 0);
    assert_eq!(a.active_count.team0, 0);
    assert!(a.active_ref_counts.iter().all(|c| *c == 0));
}

#[test]
fn callbacks_fire_once_per_event_and_account() {
    let seen = Arc::new(Mutex::new(BTreeMap::<String, usize>::new()));
    let (s1, s2) = (seen.clone(), seen.clone());
    let hooks = HookRegistry::new()
        .with(ReferralHook::StakeChanged, move |_, a| {
            *s1.lock().unwrap().entry(format!("stake:{a}")).or_default() += 1;
            Ok(())
        })
        .with(ReferralHook::StatusUpdated, move |_, a| {
            *s2.lock().unwrap().entry(format!("status:{a}")).or_default() += 1;
            Ok(())
        });
    let h = Harness::with_hooks(hooks);
    h.root("g");
    h.child("g", "p");
    for c in ["c1", "c2", "c3"] {
        h.child("p", c);
    }
    seen.lock().unwrap().clear();

    h.stake("p", ONE_ACTIVE_STAKE);
    h.stake("c1", ONE_ACTIVE_STAKE);
    seen.lock().unwrap().clear();

    // touches p several times (team stake, first line, refcounts) and g
    h.stake("c2", ONE_ACTIVE_STAKE);
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.get("stake:c2"), Some(&1));
    assert_eq!(seen.get("stake:p"), Some(&1));
    assert_eq!(seen.get("stake:g"), Some(&1));
    assert_eq!(seen.get("status:c2"), Some(&1));
    assert!(seen.values().all(|n| *n == 1));
}

#[test]
fn zero_delta_fires_no_stake_callbacks() {
    let count = Arc::new(Mutex::new(0usize));
    let c = count.clone();
    let hooks = HookRegistry::new().with(ReferralHook::StakeChanged, move |_, _| {
        *c.lock().unwrap() += 1;
        Ok(())
    });
    let h = Harness::with_hooks(hooks);
    h.root("a");
    h.child("a", "b");
    *count.lock().unwrap() = 0;

    h.stake("b", 0);
    assert_eq!(*count.lock().unwrap(), 0);
}

#[test]
fn team_stake_reaches_root_but_activity_stops_after_fourteen_levels() {
    let h = Harness::new();
    let names: Vec<String> = (0..20).map(|i| format!("n{i:02}")).collect();
    h.chain(&names);

    h.stake("n19", ONE_ACTIVE_STAKE);

    for name in &names[..19] {
        assert_eq!(h.record(name).team_delegated, 100_000_000, "{name}");
    }
    // n05 is 14 generations above n19, n04 is 15
    assert_eq!(h.record("n05").active_ref_counts[14], 1);
    assert_eq!(h.record("n18").active_ref_counts[1], 1);
    assert!(h.record("n04").active_ref_counts.iter().all(|c| *c == 0));
    assert!(h.record("n00").active_ref_counts.iter().all(|c| *c == 0));
}

#[test]
fn three_by_three_ripples_only_on_exact_borders() {
    let h = Harness::new();
    h.root("g");
    h.child("g", "p");
    for c in ["c1", "c2", "c3", "c4"] {
        h.child("p", c);
    }
    h.stake("p", ONE_ACTIVE_STAKE);
    assert_eq!(h.record("g").active_count.first_line, 1);

    h.stake("c1", ONE_ACTIVE_STAKE);
    h.stake("c2", ONE_ACTIVE_STAKE);
    assert_eq!(h.record("g").active_count.first_line_by3, 0);

    h.stake("c3", ONE_ACTIVE_STAKE);
    assert_eq!(h.record("p").active_count.first_line, 3);
    assert_eq!(h.record("g").active_count.first_line_by3, 1);

    h.stake("c4", ONE_ACTIVE_STAKE);
    assert_eq!(h.record("g").active_count.first_line_by3, 1);

    h.stake("c4", -ONE_ACTIVE_STAKE);
    assert_eq!(h.record("g").active_count.first_line_by3, 1);

    h.stake("c3", -ONE_ACTIVE_STAKE);
    assert_eq!(h.record("p").active_count.first_line, 2);
    assert_eq!(h.record("g").active_count.first_line_by3, 0);
}

#[test]
fn inactive_parent_does_not_ripple_until_it_activates() {
    let h = Harness::new();
    h.root("g");
    h.child("g", "p");
    for c in ["c1", "c2", "c3"] {
        h.child("p", c);
        h.stake(c, ONE_ACTIVE_STAKE);
    }
    assert_eq!(h.record("g").active_count.first_line_by3, 0);

    h.stake("p", ONE_ACTIVE_STAKE);
    let g = h.record("g");
    assert_eq!(g.active_count.first_line, 1);
    assert_eq!(g.active_count.first_line_by3, 1);
}

#[test]
fn forest_integrity_is_enforced() {
    let h = Harness::new();
    h.root("a");
    h.child("a", "b");
    let ctx = h.ctx();

    assert!(matches!(
        h.keeper.append_child(&ctx, &acc("a"), &acc("b")),
        Err(ReferralError::AlreadyExists(_))
    ));
    assert!(matches!(
        h.keeper.add_top_level_account(&ctx, &acc("b"), Status::New),
        Err(ReferralError::AlreadyExists(_))
    ));
    assert!(matches!(
        h.keeper.append_child(&ctx, &acc("nobody"), &acc("c")),
        Err(ReferralError::ParentNotFound(_))
    ));
    let msg = MsgRegisterReferral {
        referrer: String::new(),
        referral: "c".into(),
    };
    assert!(matches!(
        h.keeper.register_referral(&ctx, &msg),
        Err(ReferralError::InvalidParent)
    ));
    assert!(!h.keeper.exists(&ctx, &acc("c")).unwrap());

    assert_eq!(h.keeper.get_children(&ctx, &acc("a")).unwrap(), vec![acc("b")]);
    assert_eq!(h.keeper.get_parent(&ctx, &acc("b")).unwrap(), Some(acc("a")));
    assert_eq!(h.keeper.get_top_level_accounts(&ctx).unwrap(), vec![acc("a")]);
}

#[test]
fn status_downgrade_round_trip() {
    let h = Harness::new();
    h.root("a");
    h.stake("a", ONE_ACTIVE_STAKE);
    assert_eq!(h.record("a").status, Status::Starter);
    let period = Params::default().status_downgrade_period_secs;

    // falling below the requirement schedules a downgrade
    let ctx = h.ctx();
    h.keeper.on_balance_changed(&ctx, &acc("a"), -1).unwrap();
    let at = Timestamp::new(1_000 + period);
    assert_eq!(h.record("a").status_downgrade_at, Some(at));
    assert_eq!(
        ctx.events(),
        vec![ReferralNotice::StatusWillBeDowngraded { account: acc("a"), at }]
    );

    // fixing it cancels
    h.clock.advance(10);
    h.stake("a", 1);
    assert_eq!(h.record("a").status_downgrade_at, None);
    assert!(h.keeper.scheduled_downgrades(&h.ctx()).unwrap().is_empty());

    // failing again and waiting it out downgrades by one tier
    h.stake("a", -1);
    let at = h.record("a").status_downgrade_at.unwrap();
    assert_eq!(at, Timestamp::new(1_010 + period));

    h.clock.set(at.as_secs() - 1);
    h.keeper.begin_block(&h.ctx()).unwrap();
    assert_eq!(h.record("a").status, Status::Starter);

    h.clock.set(at.as_secs());
    let ctx = h.ctx();
    h.keeper.begin_block(&ctx).unwrap();
    let a = h.record("a");
    assert_eq!(a.status, Status::New);
    assert_eq!(a.status_downgrade_at, None);
    assert!(h.keeper.scheduled_downgrades(&ctx).unwrap().is_empty());
    assert_eq!(
        ctx.events(),
        vec![ReferralNotice::StatusUpdated {
            account: acc("a"),
            before: Status::Starter,
            after: Status::New
        }]
    );
}

#[test]
fn queue_drains_in_time_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let o = order.clone();
    let hooks = HookRegistry::new().with(ReferralHook::StatusUpdated, move |_, a| {
        o.lock().unwrap().push(a.to_string());
        Ok(())
    });
    let h = Harness::with_hooks(hooks);
    for name in ["x", "y", "z"] {
        h.root(name);
        h.stake(name, ONE_ACTIVE_STAKE);
    }
    h.stake("z", -1);
    h.clock.advance(5);
    h.stake("x", -1);
    h.clock.advance(5);
    h.stake("y", -1);
    order.lock().unwrap().clear();

    h.clock.advance(Params::default().status_downgrade_period_secs);
    let ctx = h.ctx();
    assert_eq!(h.keeper.perform_status_downgrade_schedule(&ctx).unwrap(), 3);
    assert_eq!(*order.lock().unwrap(), vec!["z", "x", "y"]);
}

#[test]
fn fees_with_no_ancestors_are_burned() {
    let h = Harness::new();
    let mut params = Params::default();
    params.delegating_award = [Fraction::ZERO; 14];
    params.delegating_award[0] = Fraction::percent(30);
    h.keeper.set_params(&h.ctx(), &params).unwrap();
    h.root("a");

    let ctx = h.ctx();
    let (fees, burn) = h.keeper.get_referral_fees_for_delegating(&ctx, &acc("a")).unwrap();
    assert!(fees.is_empty());
    assert_eq!(burn, Fraction::percent(30));

    let remain = h.keeper.pay_up_fees(&ctx, &acc("a"), 1000).unwrap();
    assert_eq!(remain, 700);
    assert_eq!(h.bank.burned(), 300);
    assert_eq!(
        h.bank.calls(),
        vec![
            BankCall::SendToModule {
                sender: b"a".to_vec(),
                module: "referral".into(),
                coins: vec![Coin::new(DENOM, 300)],
            },
            BankCall::Burn {
                module: "referral".into(),
                coins: vec![Coin::new(DENOM, 300)],
            },
        ]
    );
    assert!(ctx.events().is_empty());
}

#[test]
fn fees_go_to_ancestors_with_open_lines() {
    let h = Harness::new();
    h.keeper
        .add_top_level_account(&h.ctx(), &acc("a"), Status::Starter)
        .unwrap();
    h.child("a", "b");
    h.child("b", "c");

    let ctx = h.ctx();
    let remain = h.keeper.pay_up_fees(&ctx, &acc("c"), 10_000).unwrap();

    // b is NEW: its 5% is burned; a is STARTER: collects level two (1%)
    assert_eq!(h.bank.burned(), 1_400);
    assert_eq!(remain, 8_500);
    let transfers: Vec<BankCall> = h
        .bank
        .calls()
        .into_iter()
        .filter(|c| matches!(c, BankCall::InputOutput { .. }))
        .collect();
    assert_eq!(transfers.len(), 1);
    let BankCall::InputOutput { input, outputs } = &transfers[0] else {
        unreachable!()
    };
    assert_eq!(input.coins, vec![Coin::new(DENOM, 100)]);
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].address, b"a".to_vec());
    assert_eq!(
        ctx.events(),
        vec![ReferralNotice::ReferralFeePaid {
            from: acc("c"),
            to: acc("a"),
            amount: Coin::new(DENOM, 100)
        }]
    );
}

#[test]
fn bank_failure_surfaces_as_error() {
    let h = Harness::new();
    h.root("a");
    h.bank.fail_with("insufficient funds");
    let err = h.keeper.pay_up_fees(&h.ctx(), &acc("a"), 1_000).unwrap_err();
    assert!(matches!(err, ReferralError::Bank(_)));
}

#[test]
fn resource_exhaustion_propagates_unwrapped_and_branch_discards_writes() {
    let h = Harness::with_store(MeteredStore::unlimited(), HookRegistry::new());
    h.root("a");
    h.child("a", "b");
    let before = h.store.inner().range(&[], None).unwrap();

    for limit in 0..20 {
        h.store.set_limit(limit);
        let branch = BranchStore::new(&h.store);
        let ctx = axm_referral::Context::new(&branch, h.clock.now());
        match h.keeper.on_balance_changed(&ctx, &acc("b"), ONE_ACTIVE_STAKE) {
            Err(err) => assert!(matches!(err, ReferralError::ResourceExhausted(_)), "{err:?}"),
            Ok(()) => break,
        }
        h.store.set_limit(u64::MAX);
        assert_eq!(h.store.inner().range(&[], None).unwrap(), before);
    }
}

#[test]
fn failed_listener_rolls_back_with_the_branch() {
    let hooks = HookRegistry::new().with(ReferralHook::StatusUpdated, |_, _| {
        Err(ReferralError::Hook("rejected".into()))
    });
    let h = Harness::with_hooks(hooks);
    h.root("a");

    {
        let branch = BranchStore::new(&h.store);
        let ctx = axm_referral::Context::new(&branch, h.clock.now());
        let err = h
            .keeper
            .on_balance_changed(&ctx, &acc("a"), ONE_ACTIVE_STAKE)
            .unwrap_err();
        assert!(matches!(
            err,
            ReferralError::Callback {
                event: ReferralHook::StatusUpdated,
                ..
            }
        ));
        assert!(branch.pending() > 0);
    }
    assert_eq!(h.record("a").self_delegated, 0);
}

#[test]
fn unknown_account_stake_change_is_ignored() {
    let h = Harness::new();
    h.stake("stranger", ONE_ACTIVE_STAKE);
    assert!(h.store.is_empty());
}

#[test]
fn messages_validate_addresses_and_authority() {
    let h = Harness::new();
    h.root("axm1root");
    let ctx = h.ctx();

    h.keeper
        .register_referral(
            &ctx,
            &MsgRegisterReferral {
                referrer: "axm1root".into(),
                referral: "axm1kid".into(),
            },
        )
        .unwrap();
    assert_eq!(h.keeper.get_parent(&ctx, &acc("axm1kid")).unwrap(), Some(acc("axm1root")));

    assert!(matches!(
        h.keeper.register_referral(
            &ctx,
            &MsgRegisterReferral {
                referrer: "axm1ghost".into(),
                referral: "axm1other".into(),
            },
        ),
        Err(ReferralError::ParentNotFound(_))
    ));

    let mut params = Params::default();
    params.status_downgrade_period_secs = 60;
    let wrong = MsgUpdateParams {
        authority: "axm1mallory".into(),
        params: params.clone(),
    };
    assert!(matches!(
        h.keeper.update_params(&ctx, &wrong),
        Err(ReferralError::Unauthorized { .. })
    ));
    let right = MsgUpdateParams {
        authority: "axm1gov".into(),
        params,
    };
    h.keeper.update_params(&ctx, &right).unwrap();
    assert_eq!(h.keeper.params(&ctx).unwrap().status_downgrade_period_secs, 60);

    let mut greedy = Params::default();
    greedy.delegating_award[0] = Fraction::ONE;
    assert!(matches!(
        h.keeper.update_params(
            &ctx,
            &MsgUpdateParams {
                authority: "axm1gov".into(),
                params: greedy
            }
        ),
        Err(ReferralError::InvalidParams(_))
    ));
}

#[test]
fn codec_rejects_foreign_addresses() {
    let keeper = axm_referral::Keeper::new(
        Arc::new(axm_nullables::NullBank::new()),
        Arc::new(axm_nullables::NullStaking::default()),
        Arc::new(axm_nullables::NullAddressCodec::with_prefix("axm1")),
        acc("axm1gov"),
        HookRegistry::new(),
    );
    let store = MemStore::new();
    let ctx = axm_referral::Context::new(&store, Timestamp::EPOCH);
    keeper
        .add_top_level_account(&ctx, &acc("axm1root"), Status::New)
        .unwrap();
    let err = keeper
        .register_referral(
            &ctx,
            &MsgRegisterReferral {
                referrer: "axm1root".into(),
                referral: "cosmos1kid".into(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, ReferralError::InvalidAddress(_)));
}

#[test]
fn queries_map_errors() {
    let h = Harness::new();
    h.root("a");
    h.child("a", "b");
    h.stake("b", 250_000_000);
    let ctx = h.ctx();
    let q = Querier::new(&h.keeper);

    assert!(q.exists(&ctx, "a").unwrap());
    assert!(!q.exists(&ctx, "zzz").unwrap());
    assert!(!q.exists(&ctx, "").unwrap());
    assert!(q.children(&ctx, "").unwrap().is_empty());
    assert_eq!(q.children(&ctx, "a").unwrap(), vec![acc("b")]);
    assert_eq!(q.coins(&ctx, "a").unwrap().delegated, 250_000_000);
    assert_eq!(q.coins(&ctx, "b").unwrap().delegated, 250_000_000);
    assert_eq!(q.status(&ctx, "b").unwrap(), Status::Starter);
    assert_eq!(q.parent(&ctx, "b").unwrap(), Some(acc("a")));
    assert_eq!(q.params(&ctx).unwrap(), Params::default());

    assert!(matches!(q.get(&ctx, "zzz"), Err(QueryError::NotFound(_))));
    assert!(matches!(q.get(&ctx, ""), Err(QueryError::InvalidArgument(_))));
    assert!(matches!(
        q.check_status(&ctx, "b", Status::Unspecified),
        Err(QueryError::InvalidArgument(_))
    ));

    let check = q.check_status(&ctx, "b", Status::Leader).unwrap();
    assert!(!check.overall);
    assert_eq!(check.criteria.len(), 3);
    assert!(check.criteria[1].met);
}

#[test]
fn staking_hooks_drive_the_keeper() {
    let h = Harness::new();
    h.root("a");
    h.child("a", "b");
    let ctx = h.ctx();
    let hooks = h.keeper.staking_hooks();

    hooks
        .check_delegation_available(&ctx, &acc("b"), "valoper1")
        .unwrap();
    assert!(matches!(
        hooks.check_delegation_available(&ctx, &acc("ghost"), "valoper1"),
        Err(ReferralError::NotFound(_))
    ));

    hooks
        .delegation_coins_modified(&ctx, &acc("b"), "valoper1", 0, 150_000_000)
        .unwrap();
    assert!(h.record("b").active);
    hooks
        .delegation_coins_modified(&ctx, &acc("b"), "valoper1", 150_000_000, 20_000_000)
        .unwrap();
    let b = h.record("b");
    assert!(!b.active);
    assert_eq!(b.self_delegated, 20_000_000);

    let remain = hooks.spend_coins_for_ref(&ctx, &acc("b"), 1_000).unwrap();
    assert_eq!(remain, 850);
}

#[test]
fn status_reader_exposes_tiers() {
    let h = Harness::new();
    h.root("a");
    h.stake("a", ONE_ACTIVE_STAKE);
    let reader: &dyn StatusReader = &h.keeper;
    let ctx = h.ctx();
    assert_eq!(reader.status(&ctx, &acc("a")).unwrap(), Status::Starter);
    assert!(reader.exists(&ctx, &acc("a")).unwrap());
    assert!(!reader.exists(&ctx, &acc("b")).unwrap());
}

#[test]
fn iterate_writes_back_changed_records() {
    let h = Harness::new();
    h.root("a");
    h.root("b");
    h.stake("b", ONE_ACTIVE_STAKE);

    let ctx = h.ctx();
    h.keeper
        .iterate(&ctx, |id, rec| {
            if id.as_str() == "a" {
                rec.status = Status::Leader;
                (true, false)
            } else {
                (false, false)
            }
        })
        .unwrap();
    assert_eq!(h.record("a").status, Status::Leader);
    assert_eq!(h.record("b").status, Status::Starter);

    // a no longer meets LEADER: a status pass schedules its downgrade
    h.keeper.iterate(&ctx, |_, _| (false, true)).unwrap();
    assert!(h.record("a").status_downgrade_at.is_some());
    assert!(h.record("b").status_downgrade_at.is_none());
}

#[test]
fn root_climbs_to_leader_through_stake_changes_only() {
    let h = Harness::new();
    h.root("a");
    for c in ["c1", "c2", "c3"] {
        h.child("a", c);
    }
    let updated = |events: &[ReferralNotice], before, after| {
        events.contains(&ReferralNotice::StatusUpdated {
            account: acc("a"),
            before,
            after,
        })
    };

    let ctx = h.ctx();
    h.keeper
        .on_balance_changed(&ctx, &acc("a"), 250_000_000)
        .unwrap();
    assert!(updated(&ctx.take_events(), Status::New, Status::Starter));
    assert_eq!(h.record("a").status, Status::Starter);

    h.stake("c1", ONE_ACTIVE_STAKE);
    h.stake("c2", ONE_ACTIVE_STAKE);
    let a = h.record("a");
    assert_eq!(a.status, Status::Starter);
    assert_eq!(a.active_count.first_line, 2);

    // third active referral brings team stake to exactly 20,000
    let ctx = h.ctx();
    h.keeper
        .on_balance_changed(&ctx, &acc("c3"), 19_800_000_000)
        .unwrap();
    assert!(updated(&ctx.take_events(), Status::Starter, Status::Leader));

    let a = h.record("a");
    assert_eq!(a.status, Status::Leader);
    assert_eq!(a.active_count.first_line, 3);
    assert_eq!(a.team_delegated, 20_000_000_000);
    assert!(a.status_downgrade_at.is_none());
}

#[test]
fn queries_apply_the_address_codec() {
    let keeper = axm_referral::Keeper::new(
        Arc::new(axm_nullables::NullBank::new()),
        Arc::new(axm_nullables::NullStaking::default()),
        Arc::new(axm_nullables::NullAddressCodec::with_prefix("axm1")),
        acc("axm1gov"),
        HookRegistry::new(),
    );
    let store = MemStore::new();
    let ctx = axm_referral::Context::new(&store, Timestamp::EPOCH);
    keeper
        .add_top_level_account(&ctx, &acc("axm1root"), Status::New)
        .unwrap();
    let q = Querier::new(&keeper);

    assert!(q.get(&ctx, "axm1root").is_ok());
    assert!(q.exists(&ctx, "axm1root").unwrap());
    assert!(!q.exists(&ctx, "cosmos1root").unwrap());
    assert!(matches!(
        q.get(&ctx, "cosmos1root"),
        Err(QueryError::InvalidArgument(_))
    ));
    assert!(matches!(
        q.children(&ctx, "cosmos1root"),
        Err(QueryError::InvalidArgument(_))
    ));
    assert!(matches!(
        q.check_status(&ctx, "cosmos1root", Status::Starter),
        Err(QueryError::InvalidArgument(_))
    ));
}
