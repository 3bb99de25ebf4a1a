// Host-side tests for scene composition and the frame driver, using a
// renderer that records what it is asked to draw.

use glam::Vec3;
use glass_melon::core::*;
use glass_melon::frame::{FrameScheduler, MonotonicClock};
use glass_melon::scene::*;
use glass_melon::EngineConfig;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Node(usize);

#[derive(Debug)]
struct Recorded {
    label: &'static str,
    parent: Option<usize>,
    transform: TransformState,
    mesh: Option<MeshDesc>,
}

#[derive(Default)]
struct RecordingRenderer {
    stage: Option<StageDesc>,
    nodes: Vec<Recorded>,
    transform_writes: usize,
    submitted: Vec<f64>,
    fail_submit_at: Option<usize>,
}

impl RecordingRenderer {
    fn labelled(&self, label: &str) -> Vec<usize> {
        (0..self.nodes.len()).filter(|&i| self.nodes[i].label == label).collect()
    }

    fn surface(&self, i: usize) -> &Rc<SurfaceMesh> {
        &self.nodes[i].mesh.as_ref().expect("mesh node").surface
    }
}

impl SceneRenderer for RecordingRenderer {
    type Node = Node;

    fn configure_stage(&mut self, stage: &StageDesc) -> anyhow::Result<()> {
        self.stage = Some(stage.clone());
        Ok(())
    }

    fn create_group(
        &mut self,
        label: &'static str,
        parent: Option<Node>,
        transform: TransformState,
    ) -> anyhow::Result<Node> {
        self.nodes.push(Recorded {
            label,
            parent: parent.map(|p| p.0),
            transform,
            mesh: None,
        });
        Ok(Node(self.nodes.len() - 1))
    }

    fn create_mesh(&mut self, parent: Option<Node>, mesh: MeshDesc) -> anyhow::Result<Node> {
        self.nodes.push(Recorded {
            label: mesh.label,
            parent: parent.map(|p| p.0),
            transform: mesh.transform,
            mesh: Some(mesh),
        });
        Ok(Node(self.nodes.len() - 1))
    }

    fn set_transform(&mut self, node: Node, transform: &TransformState) {
        self.nodes[node.0].transform = *transform;
        self.transform_writes += 1;
    }

    fn submit(&mut self, elapsed: f64) -> anyhow::Result<()> {
        self.submitted.push(elapsed);
        if self.fail_submit_at == Some(self.submitted.len()) {
            anyhow::bail!("device lost");
        }
        Ok(())
    }
}

fn scene() -> Scene<RecordingRenderer> {
    let config = EngineConfig {
        hemisphere_segments: 16,
        ..EngineConfig::seeded(11)
    };
    Scene::new(RecordingRenderer::default(), &config).expect("scene builds")
}

#[test]
fn stage_is_configured_once_with_fixed_camera() {
    let s = scene();
    let stage = s.renderer().stage.as_ref().expect("stage configured");
    assert_eq!(stage.camera.eye, Vec3::new(0.0, 0.2, 4.5));
    assert!((stage.camera.fovy_radians - 32f32.to_radians()).abs() < 1e-6);
    assert_eq!(stage.lights.len(), 2);
    assert_eq!(stage.environment.preset, EnvironmentPreset::Studio);
    assert_eq!(stage.tone_mapping, ToneMapping::AcesFilmic);
    assert!(stage.contact_shadow.opacity > 0.0);
}

#[test]
fn hierarchy_contains_every_part() {
    let s = scene();
    let r = s.renderer();
    assert_eq!(r.labelled("assembly").len(), 1);
    assert_eq!(r.labelled("half").len(), 2);
    assert_eq!(r.labelled("shell").len(), 2);
    assert_eq!(r.labelled("flesh").len(), 2);
    assert_eq!(r.labelled("rind").len(), 2);
    assert_eq!(r.labelled("seed").len(), 2 * SEEDS_PER_HALF);
    assert_eq!(r.labelled("droplet").len(), DROPLET_COUNT);
    assert_eq!(r.labelled("blade").len(), 1);
    assert_eq!(r.labelled("handle").len(), 1);
    assert_eq!(r.labelled("sparkle").len(), SPARKLE_COUNT);

    // Halves hang off the float group, which hangs off the assembly
    let float = r.labelled("float")[0];
    let assembly = r.labelled("assembly")[0];
    assert_eq!(r.nodes[float].parent, Some(assembly));
    for half in r.labelled("half") {
        assert_eq!(r.nodes[half].parent, Some(float));
    }
    // The knife is not part of the swaying assembly
    let knife = r.labelled("knife")[0];
    assert_eq!(r.nodes[knife].parent, None);
    assert_eq!(r.nodes[r.labelled("blade")[0]].parent, Some(knife));
}

#[test]
fn half_surfaces_come_from_the_shared_cache() {
    let s = scene();
    let r = s.renderer();
    let shells = r.labelled("shell");
    let left = s.geometry().half(Side::Left);
    let right = s.geometry().half(Side::Right);
    assert!(Rc::ptr_eq(r.surface(shells[0]), &left.shell));
    assert!(Rc::ptr_eq(r.surface(shells[1]), &right.shell));

    // Every droplet shares one sphere
    let droplets = r.labelled("droplet");
    let first = r.surface(droplets[0]);
    assert!(droplets.iter().all(|&i| Rc::ptr_eq(r.surface(i), first)));
}

#[test]
fn frames_apply_transforms_before_submitting() {
    let mut s = scene();
    let quarter = Kinematics::default().blade_cycle.period() / 4.0;
    s.render_frame(quarter).expect("frame renders");

    let r = s.renderer();
    assert_eq!(r.submitted, vec![quarter]);
    // assembly, float, blade, two halves, then every particle
    assert_eq!(r.transform_writes, 5 + DROPLET_COUNT + SPARKLE_COUNT);
    let expected = Kinematics::default().pose(quarter);
    assert_eq!(r.nodes[r.labelled("blade")[0]].transform, expected.blade);
    assert_eq!(r.nodes[r.labelled("assembly")[0]].transform, expected.assembly);
    let halves = r.labelled("half");
    assert_eq!(r.nodes[halves[0]].transform, expected.halves[0]);
    assert_eq!(r.nodes[halves[1]].transform, expected.halves[1]);
    assert_eq!(*s.pose(), expected);

    let droplet = r.labelled("droplet")[3];
    let p = s.droplets().particles()[3].position_at(quarter);
    assert_eq!(r.nodes[droplet].transform.position, p);
}

#[test]
fn geometry_is_not_rebuilt_across_frames() {
    let mut s = scene();
    let node_count = s.renderer().nodes.len();
    let shell = s.geometry().half(Side::Left);
    for i in 0..10 {
        s.render_frame(i as f64 / 60.0).expect("frame renders");
    }
    assert_eq!(s.renderer().nodes.len(), node_count);
    assert!(Rc::ptr_eq(&shell, &s.geometry().half(Side::Left)));
}

#[test]
fn same_seed_same_scene() {
    let mut a = scene();
    let mut b = scene();
    a.render_frame(5.5).expect("frame renders");
    b.render_frame(5.5).expect("frame renders");
    let pa: Vec<_> = a.renderer().nodes.iter().map(|n| n.transform).collect();
    let pb: Vec<_> = b.renderer().nodes.iter().map(|n| n.transform).collect();
    assert_eq!(pa, pb);
}

#[test]
fn scheduler_measures_time_from_the_first_tick() {
    let mut sched = FrameScheduler::new(scene());
    assert_eq!(sched.tick(100.0), 0.0);
    assert!((sched.tick(100.5) - 0.5).abs() < 1e-12);
    // Backwards timestamps hold the clock
    assert!((sched.tick(100.2) - 0.5).abs() < 1e-12);
    assert_eq!(sched.frames(), 3);
    assert_eq!(sched.update().renderer().submitted.len(), 3);
}

#[test]
fn a_failed_frame_is_skipped_and_the_next_one_heals() {
    let mut s = scene();
    s.renderer_mut().fail_submit_at = Some(2);
    let mut sched = FrameScheduler::new(s);
    sched.tick(0.0);
    sched.tick(1.0);
    sched.tick(2.0);
    assert_eq!(sched.frames(), 3);
    assert_eq!(sched.skipped(), 1);

    let expected = Kinematics::default().pose(2.0);
    assert_eq!(*sched.update().pose(), expected);
}

#[test]
fn closures_can_drive_the_scheduler() {
    let mut seen = Vec::new();
    {
        let mut sched = FrameScheduler::new(|t: f64| -> anyhow::Result<()> {
            seen.push(t);
            Ok(())
        });
        sched.tick(3.0);
        sched.tick(3.25);
    }
    assert_eq!(seen, vec![0.0, 0.25]);
}

#[test]
fn a_host_clock_drives_the_scheduler_forward() {
    let clock = MonotonicClock::start();
    let mut sched = FrameScheduler::new(scene());
    let first = sched.tick_now(&clock);
    assert_eq!(first, 0.0);
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = sched.tick_now(&clock);
    assert!(second > first);
    assert!(clock.now_sec() >= second);
    assert_eq!(sched.update().renderer().submitted, vec![first, second]);
}

#[test]
fn materials_mark_transparency() {
    assert!(MaterialDesc::glass_shell().is_transparent());
    assert!(MaterialDesc::flesh().is_transparent());
    assert!(MaterialDesc::sparkle().is_transparent());
    assert!(!MaterialDesc::seed().is_transparent());
    assert!(!MaterialDesc::blade_steel().is_transparent());
    assert_eq!(hex_rgb(0xff0080), [1.0, 0.0, 128.0 / 255.0]);
}
