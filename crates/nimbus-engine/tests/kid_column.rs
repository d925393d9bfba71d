//! Integration test: a kinematic column run end to end.
//!
//! A prescribed half-sine updraft lifts a seeded population through the
//! 129-level column. Droplets leaving through the top are recycled at
//! the dry radius, so the population must be the same size at the end,
//! and the observers must see every observation step in order.

use nimbus_core::{Axis, ModelStep};
use nimbus_domain::{create_gridboxes, MoveSupersInDomain, WindMotion};
use nimbus_engine::{
    BoundarySelection, KinematicColumnDynamics, KinematicComms, SdmConfig, SdmMethods,
    Timesteps, TimestepRunner,
};
use nimbus_maps::GridboxMaps;
use nimbus_obs::{ConstStepObserver, NsupersRecord, Observer};
use nimbus_test_utils::{kid_column, seeded, ObsEvent, RecordingObserver};

fn config() -> SdmConfig {
    SdmConfig {
        resolution: 1.0,
        couplstep: 2.0,
        motionstep: 1.0,
        obsstep: 60.0,
        t_end: 600.0,
        boundary: BoundarySelection::TopReinitialisation,
        dry_radius: 0.0,
        ..Default::default()
    }
}

#[test]
fn kinematic_column_keeps_population_and_lifts_droplets() {
    let cfg = config();
    let ts = Timesteps::from_config(&cfg).unwrap();
    let bcs = cfg.boundary_conditions().unwrap();

    let maps = kid_column();
    let mut gbxs = create_gridboxes(&maps);
    let supers = seeded(&maps, 2, 42);
    let n0 = supers.totnsupers();
    let mean_z0 = supers.all().iter().map(|d| d.position.z).sum::<f64>() / n0 as f64;
    let ztop = maps.domain_bounds().upper.get(Axis::Z);

    let recorder = RecordingObserver::new(ts.obsstep);
    let log = recorder.log();
    let obs = recorder.then(ConstStepObserver::new(ts.obsstep, NsupersRecord::new()));
    let movesupers = MoveSupersInDomain::new(
        WindMotion::new(ts.motionstep, ts.motionstep as f64 * cfg.resolution),
        bcs,
    );
    let dynamics =
        KinematicColumnDynamics::standard_atmosphere(ts.couplstep, cfg.resolution, &maps);
    let sdm = SdmMethods::new(ts.couplstep, maps, movesupers, obs);
    let mut runner = TimestepRunner::new(sdm, dynamics, KinematicComms, ts.t_end).unwrap();

    let report = runner.run(&mut gbxs, supers).unwrap();

    assert_eq!(report.supers.totnsupers(), n0);
    assert_eq!(report.transport.nremoved, 0);
    assert!(report.transport.nreinserted > 0);
    assert!(report.transport.nmoved > 0);
    assert!(report.supers.check_positions(runner.sdm().maps()).is_ok());
    assert!(report.supers.all().iter().all(|d| d.position.z < ztop));

    // Recycled droplets sit in the top gridbox at the dry radius.
    let top = runner.sdm().maps().top();
    assert!(report.supers.view_for(top).iter().any(|d| d.radius == 0.0));

    // The survivors that were not recycled have risen on average.
    let risen: Vec<f64> = report
        .supers
        .all()
        .iter()
        .filter(|d| d.radius > 0.0)
        .map(|d| d.position.z)
        .collect();
    let mean_z = risen.iter().sum::<f64>() / risen.len() as f64;
    assert!(mean_z > mean_z0);

    // After the forcing period the updraft has died away.
    assert_eq!(runner.dynamics().wvel(), 0.0);

    let events = log.lock().unwrap().clone();
    assert_eq!(events.first(), Some(&ObsEvent::Before { nsupers: n0 }));
    assert_eq!(events.last(), Some(&ObsEvent::After));
    let observed: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            ObsEvent::Observe { t, nsupers } => {
                assert_eq!(*nsupers, n0);
                Some(*t)
            }
            _ => None,
        })
        .collect();
    assert_eq!(observed, (0..=600).step_by(60).collect::<Vec<_>>());

    let (sdm, _) = runner.into_parts();
    let (_, counts) = sdm.into_observer().into_parts();
    let counts = counts.into_action();
    assert_eq!(counts.totals().len(), 11);
    assert!(counts.totals().iter().all(|&n| n == n0));
}

#[test]
fn updraft_reaches_gridboxes_on_coupling_steps() {
    let cfg = config();
    let ts = Timesteps::from_config(&cfg).unwrap();
    let maps = kid_column();
    let mut gbxs = create_gridboxes(&maps);
    let supers = seeded(&maps, 1, 7);
    let dynamics = KinematicColumnDynamics::standard_atmosphere(ts.couplstep, 1.0, &maps);
    let sdm = SdmMethods::new(
        ts.couplstep,
        maps,
        MoveSupersInDomain::new(WindMotion::new(1, 1.0), cfg.boundary_conditions().unwrap()),
        RecordingObserver::new(ts.obsstep),
    );
    let mut runner = TimestepRunner::new(sdm, dynamics, KinematicComms, ts.t_end).unwrap();

    // Step 0 receives w(0) = 0, then the dynamics advance to w(0).
    let (supers, m) = runner.step(ModelStep(0), &mut gbxs, supers);
    assert_eq!(m.t_next.0, 2);
    assert_eq!(gbxs[10].state.wvel.centre(), 0.0);

    // Step 2 receives the updraft set at step 0 and sets w(2).
    let (_, _) = runner.step(ModelStep(2), &mut gbxs, supers);
    let w2 = runner.dynamics().updraft(2.0);
    assert!(w2 > 0.0);
    assert_eq!(runner.dynamics().wvel(), w2);
    assert_eq!(gbxs[10].state.wvel.centre(), 0.0);
    assert!(gbxs[10].state.temp < 288.15);
}
