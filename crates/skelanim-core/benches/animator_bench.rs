use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::{Mat4, Quat, Vec3};
use skelanim_core::{
    Animation, Animator, AnimatorConfig, BoneIndex, HierarchyBuilder, Keyframe, KeyframeTrack,
    MAX_BONES, NodeId,
};
use std::hint::black_box;
use std::sync::Arc;

/// A chain of `bones` nodes, every one animated with `keys` keys per channel
fn create_chain(bones: usize, keys: usize) -> (Arc<Animation>, Arc<BoneIndex>) {
    let mut builder = HierarchyBuilder::new("bone0", Mat4::IDENTITY);
    let mut parent = NodeId::ROOT;
    for i in 1..bones {
        parent = builder
            .add_child(parent, format!("bone{i}"), Mat4::from_translation(Vec3::Y))
            .unwrap();
    }

    let duration = keys as f64;
    let mut clip = Animation::builder("bench", Arc::new(builder.build()))
        .duration(duration)
        .ticks_per_second(Some(30.0));
    let mut index = BoneIndex::new();

    for i in 0..bones {
        let phase = i as f32 * 0.1;
        let track = KeyframeTrack::new(
            (0..keys)
                .map(|k| Keyframe::new(k as f64, Vec3::new(0.0, 1.0, (k as f32 + phase).sin())))
                .collect(),
            (0..keys)
                .map(|k| Keyframe::new(k as f64, Quat::from_rotation_x(k as f32 * 0.05 + phase)))
                .collect(),
            vec![Keyframe::new(0.0, Vec3::ONE)],
        )
        .unwrap();
        let name = format!("bone{i}");
        clip = clip.track(name.clone(), track);
        index.register(name, Mat4::from_translation(Vec3::new(0.0, -(i as f32), 0.0)));
    }

    (Arc::new(clip.build().unwrap()), Arc::new(index))
}

fn update_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("animator_update");

    for keys in [4, 64, 1024] {
        let (clip, index) = create_chain(MAX_BONES, keys);
        let mut animator =
            Animator::with_animation(index, clip, &AnimatorConfig::default()).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(keys), &keys, |b, _| {
            b.iter(|| {
                animator.update(black_box(1.0 / 60.0)).unwrap();
                black_box(animator.final_bone_matrices());
            })
        });
    }

    group.finish();
}

fn sample_benchmark(c: &mut Criterion) {
    let (clip, _) = create_chain(1, 1024);
    let track = clip.track("bone0").unwrap();

    c.bench_function("track_local_transform", |b| {
        b.iter(|| black_box(track.local_transform(black_box(517.25))))
    });
}

criterion_group!(benches, update_benchmark, sample_benchmark);
criterion_main!(benches);
