//! Hover / focus interaction for the two devices on the table.
//!
//! Pointer and keyboard handlers never animate anything themselves. They
//! push the state they want into a request queue, and [`InteractionController::update`]
//! (called once per frame) is the only consumer: it folds the queue into the
//! pending state and, when no bundle is in flight, commits it and starts the
//! animations that take the devices and camera there. A bundle is finished
//! when every handle it started reports finished; requests arriving before
//! that only overwrite the pending state.

pub mod screen;

use crate::anim::{AnimationHandle, AnimationService};
use crate::config::{DeviceConfig, DurationConfig, InteractionConfig};
use crate::render::{HitObject, HoverObjectChanged};
use crate::scene::{NodeId, Scene};
use std::collections::VecDeque;
use std::time::Duration;

// ========================================================================
// Devices
// ========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Primary,
    Secondary,
}

impl Device {
    pub const ALL: [Device; 2] = [Device::Primary, Device::Secondary];

    pub fn other(self) -> Device {
        match self {
            Device::Primary => Device::Secondary,
            Device::Secondary => Device::Primary,
        }
    }

    fn index(self) -> usize {
        match self {
            Device::Primary => 0,
            Device::Secondary => 1,
        }
    }
}

/// Root nodes of the two devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceRoots {
    pub primary: NodeId,
    pub secondary: NodeId,
}

impl DeviceRoots {
    pub fn root(&self, device: Device) -> NodeId {
        match device {
            Device::Primary => self.primary,
            Device::Secondary => self.secondary,
        }
    }
}

/// Walk from `node` (inclusive) towards the scene root and report the first
/// device root met. `None` means the node belongs to neither device.
pub fn resolve_device(scene: &Scene, node: NodeId, roots: &DeviceRoots) -> Option<Device> {
    scene.ancestors(node).find_map(|id| {
        if id == roots.primary {
            Some(Device::Primary)
        } else if id == roots.secondary {
            Some(Device::Secondary)
        } else {
            None
        }
    })
}

// ========================================================================
// State
// ========================================================================

/// Requested target state; also the payload of a queued request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingState {
    pub focused: Option<Device>,
    pub hover: Option<Device>,
}

impl PendingState {
    pub const IDLE: PendingState = PendingState {
        focused: None,
        hover: None,
    };

    pub fn hovering(device: Option<Device>) -> Self {
        Self {
            focused: None,
            hover: device,
        }
    }

    pub fn focusing(device: Option<Device>) -> Self {
        Self {
            focused: device,
            hover: None,
        }
    }
}

/// Committed state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionState {
    pub focused: Option<Device>,
    pub hover: Option<Device>,
    /// Set while a bundle is in flight.
    pub animating: bool,
}

impl InteractionState {
    pub fn matches(&self, pending: &PendingState) -> bool {
        self.focused == pending.focused && self.hover == pending.hover
    }

    fn commit(&mut self, pending: PendingState) {
        self.focused = pending.focused;
        self.hover = pending.hover;
    }
}

// ========================================================================
// Bundle planning
// ========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    Snap,
    Short,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Durations {
    pub snap: Duration,
    pub short: Duration,
    pub long: Duration,
}

impl Durations {
    pub fn get(&self, pace: Pace) -> Duration {
        match pace {
            Pace::Snap => self.snap,
            Pace::Short => self.short,
            Pace::Long => self.long,
        }
    }
}

impl From<&DurationConfig> for Durations {
    fn from(config: &DurationConfig) -> Self {
        Self {
            snap: Duration::from_millis(config.snap_ms),
            short: Duration::from_millis(config.short_ms),
            long: Duration::from_millis(config.long_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseKind {
    Idle,
    Hover,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKey {
    Start,
    Front,
    Device(Device),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Pose {
        device: Device,
        pose: PoseKind,
        pace: Pace,
    },
    View {
        view: ViewKey,
        pace: Pace,
    },
}

/// Animations for one reconciliation pass, given whether a device was
/// focused before and the state being committed. Focus wins over hover.
pub fn plan_bundle(was_open: bool, next: PendingState) -> Vec<Step> {
    if let Some(focused) = next.focused {
        vec![
            Step::Pose {
                device: focused,
                pose: PoseKind::Active,
                pace: Pace::Long,
            },
            Step::Pose {
                device: focused.other(),
                pose: PoseKind::Idle,
                pace: Pace::Long,
            },
            Step::View {
                view: ViewKey::Device(focused),
                pace: Pace::Long,
            },
        ]
    } else if let Some(hovered) = next.hover {
        vec![
            Step::Pose {
                device: hovered,
                pose: PoseKind::Hover,
                pace: Pace::Short,
            },
            Step::Pose {
                device: hovered.other(),
                pose: PoseKind::Idle,
                pace: Pace::Short,
            },
        ]
    } else {
        let pace = if was_open { Pace::Long } else { Pace::Short };
        let mut steps: Vec<Step> = Device::ALL
            .iter()
            .map(|&device| Step::Pose {
                device,
                pose: PoseKind::Idle,
                pace,
            })
            .collect();
        if was_open {
            steps.push(Step::View {
                view: ViewKey::Front,
                pace: Pace::Long,
            });
        }
        steps
    }
}

/// Startup bundle: both devices to rest and the camera to the start view.
pub fn rest_plan() -> Vec<Step> {
    let mut steps: Vec<Step> = Device::ALL
        .iter()
        .map(|&device| Step::Pose {
            device,
            pose: PoseKind::Idle,
            pace: Pace::Snap,
        })
        .collect();
    steps.push(Step::View {
        view: ViewKey::Start,
        pace: Pace::Snap,
    });
    steps
}

// ========================================================================
// Responsive view names
// ========================================================================

/// Narrow viewports use an alternate framing stored under `name + suffix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSelector {
    narrow: bool,
    suffix: String,
}

impl ViewSelector {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            narrow: false,
            suffix: suffix.into(),
        }
    }

    pub fn set_narrow(&mut self, narrow: bool) {
        self.narrow = narrow;
    }

    pub fn view_name(&self, key: &str) -> String {
        if self.narrow {
            format!("{}{}", key, self.suffix)
        } else {
            key.to_string()
        }
    }
}

// ========================================================================
// Controller
// ========================================================================

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("scene has no node {name:?} for device {device:?}")]
    MissingNode { device: String, name: String },
}

#[derive(Debug, Clone)]
struct DeviceRig {
    name: String,
    root: NodeId,
    pose_target: NodeId,
    idle_pose: String,
    hover_pose: String,
    active_pose: String,
    view: String,
}

impl DeviceRig {
    fn resolve(scene: &Scene, config: &DeviceConfig) -> Result<Self, SetupError> {
        let missing = |name: &str| SetupError::MissingNode {
            device: config.name.clone(),
            name: name.to_string(),
        };
        let root = scene
            .find_by_name(&config.root_node)
            .ok_or_else(|| missing(&config.root_node))?;
        let pose_target = match &config.pose_node {
            Some(name) => scene
                .find_by_name_under(root, name)
                .ok_or_else(|| missing(name))?,
            None => root,
        };
        Ok(Self {
            name: config.name.clone(),
            root,
            pose_target,
            idle_pose: config.idle_pose.clone(),
            hover_pose: config.hover_pose.clone(),
            active_pose: config.active_pose.clone(),
            view: config.view.clone(),
        })
    }

    fn pose(&self, kind: PoseKind) -> &str {
        match kind {
            PoseKind::Idle => &self.idle_pose,
            PoseKind::Hover => &self.hover_pose,
            PoseKind::Active => &self.active_pose,
        }
    }
}

struct Bundle {
    handles: Vec<AnimationHandle>,
}

impl Bundle {
    fn is_finished(&self, animation: &impl AnimationService) -> bool {
        self.handles
            .iter()
            .all(|&handle| animation.is_finished(handle))
    }
}

pub struct InteractionController {
    rigs: [DeviceRig; 2],
    start_view: String,
    front_view: String,
    durations: Durations,
    views: ViewSelector,
    state: InteractionState,
    pending: PendingState,
    requests: VecDeque<PendingState>,
    in_flight: Option<Bundle>,
}

impl InteractionController {
    /// Look up both devices in the scene. Fails when any configured node is missing.
    pub fn new(scene: &Scene, config: &InteractionConfig) -> Result<Self, SetupError> {
        let rigs = [
            DeviceRig::resolve(scene, &config.primary)?,
            DeviceRig::resolve(scene, &config.secondary)?,
        ];
        Ok(Self {
            rigs,
            start_view: config.start_view.clone(),
            front_view: config.front_view.clone(),
            durations: Durations::from(&config.durations),
            views: ViewSelector::new(config.responsive.variant_suffix.clone()),
            state: InteractionState::default(),
            pending: PendingState::default(),
            requests: VecDeque::new(),
            in_flight: None,
        })
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    #[cfg(test)]
    pub fn pending(&self) -> PendingState {
        self.pending
    }

    pub fn roots(&self) -> DeviceRoots {
        DeviceRoots {
            primary: self.rigs[0].root,
            secondary: self.rigs[1].root,
        }
    }

    pub fn device_name(&self, device: Device) -> &str {
        &self.rigs[device.index()].name
    }

    pub fn set_narrow_viewport(&mut self, narrow: bool) {
        self.views.set_narrow(narrow);
    }

    pub fn view_name(&self, key: &str) -> String {
        self.views.view_name(key)
    }

    /// Establish the resting pose without visible animation.
    pub fn snap_to_rest(&mut self, scene: &Scene, animation: &mut impl AnimationService) {
        self.state.animating = true;
        let bundle = self.start(&rest_plan(), scene, animation);
        self.in_flight = Some(bundle);
    }

    pub fn on_hover_changed(&mut self, scene: &Scene, event: &HoverObjectChanged) {
        if self.state.focused.is_some() || self.focus_requested() {
            return;
        }
        let device = event
            .object
            .and_then(|object| resolve_device(scene, object, &self.roots()));
        log::debug!("Hover request: {:?}", device);
        self.request(PendingState::hovering(device));
    }

    /// Focus the clicked device and point the gizmo at its root node.
    pub fn on_hit(&mut self, scene: &Scene, event: &mut HitObject) {
        let device = event
            .selected_object
            .and_then(|object| resolve_device(scene, object, &self.roots()));
        if let Some(device) = device {
            event.selected_object = Some(self.roots().root(device));
        }
        log::debug!("Focus request: {:?}", device);
        self.request(PendingState::focusing(device));
    }

    pub fn on_close_requested(&mut self) {
        if self.state.focused.is_some() {
            log::debug!("Close request");
            self.request(PendingState::IDLE);
        }
    }

    /// Whether the newest request, queued or pending, opens a device.
    fn focus_requested(&self) -> bool {
        self.requests
            .back()
            .map_or(self.pending.focused.is_some(), |next| next.focused.is_some())
    }

    fn request(&mut self, next: PendingState) {
        self.requests.push_back(next);
    }

    /// Drain requests, retire a finished bundle and start the next one.
    /// Returns true when a new bundle was started.
    pub fn update(&mut self, scene: &Scene, animation: &mut impl AnimationService) -> bool {
        while let Some(next) = self.requests.pop_front() {
            self.pending = next;
        }

        if let Some(bundle) = &self.in_flight {
            if !bundle.is_finished(&*animation) {
                return false;
            }
            self.in_flight = None;
            self.state.animating = false;
        }

        if self.state.matches(&self.pending) {
            return false;
        }

        self.state.animating = true;
        let was_open = self.state.focused.is_some();
        self.state.commit(self.pending);
        let plan = plan_bundle(was_open, self.pending);
        log::info!("Interaction -> {}", self.status());
        let bundle = self.start(&plan, scene, animation);
        self.in_flight = Some(bundle);
        true
    }

    fn start(
        &self,
        plan: &[Step],
        scene: &Scene,
        animation: &mut impl AnimationService,
    ) -> Bundle {
        let handles = plan
            .iter()
            .filter_map(|step| match *step {
                Step::Pose { device, pose, pace } => {
                    let rig = &self.rigs[device.index()];
                    let handle = animation.animate_transform(
                        scene,
                        rig.pose_target,
                        rig.pose(pose),
                        self.durations.get(pace),
                    );
                    if handle.is_none() {
                        log::debug!("{} has no pose {:?}", rig.name, rig.pose(pose));
                    }
                    handle
                }
                Step::View { view, pace } => {
                    let key = match view {
                        ViewKey::Start => self.start_view.as_str(),
                        ViewKey::Front => self.front_view.as_str(),
                        ViewKey::Device(device) => self.rigs[device.index()].view.as_str(),
                    };
                    let name = self.view_name(key);
                    let handle = animation.animate_to_view(scene, &name, self.durations.get(pace));
                    if handle.is_none() {
                        log::debug!("Scene has no camera view {:?}", name);
                    }
                    handle
                }
            })
            .collect();
        Bundle { handles }
    }

    /// One-line summary of the committed state.
    pub fn status(&self) -> String {
        let state = self.state();
        let label = |device: Option<Device>| match device {
            Some(device) => self.device_name(device).to_string(),
            None => "-".to_string(),
        };
        format!(
            "focused: {}, hover: {}{}",
            label(state.focused),
            label(state.hover),
            if state.animating { " (animating)" } else { "" }
        )
    }
}
