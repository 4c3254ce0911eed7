// q_shared.rs — foundational types, math, and constants shared by all modules
// Converted from: myjk-original/codemp/qcommon/q_shared.h + q_math.c

// ============================================================
// Basic types
// ============================================================

pub type Vec2 = [f32; 2];
pub type Vec3 = [f32; 3];
pub type Vec4 = [f32; 4];

/// Handle to a model, shader, or skin registered with the renderer.
pub type QHandle = i32;
/// Handle to a registered sound.
pub type SfxHandle = i32;
/// Handle to a registered effect in the FX system.
pub type FxHandle = i32;

// angle indexes
pub const PITCH: usize = 0; // up / down
pub const YAW: usize = 1; // left / right
pub const ROLL: usize = 2; // fall over

pub const VEC3_ORIGIN: Vec3 = [0.0, 0.0, 0.0];
#[allow(non_upper_case_globals)]
pub const vec3_origin: Vec3 = VEC3_ORIGIN;

/// axisDefault — identity orientation basis.
pub const AXIS_DEFAULT: [Vec3; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

// ============================================================
// Limits
// ============================================================

pub const MAX_CLIENTS: usize = 32;
pub const MAX_QPATH: usize = 64;

pub const GENTITYNUM_BITS: usize = 10;
pub const MAX_GENTITIES: usize = 1 << GENTITYNUM_BITS;

// entity numbers are communicated with GENTITYNUM_BITS, so any reserved
// values that are going to be communicated over the net need to also be
// in this range
pub const ENTITYNUM_NONE: i32 = (MAX_GENTITIES - 1) as i32;
pub const ENTITYNUM_WORLD: i32 = (MAX_GENTITIES - 2) as i32;
pub const ENTITYNUM_MAX_NORMAL: i32 = (MAX_GENTITIES - 2) as i32;

pub const DEFAULT_GRAVITY: f32 = 800.0;

// ============================================================
// Error and print levels
// ============================================================

pub const ERR_FATAL: i32 = 0; // exit the entire game with a popup window
pub const ERR_DROP: i32 = 1; // print to console and disconnect from game
pub const ERR_SERVERDISCONNECT: i32 = 2; // don't kill server
pub const ERR_DISCONNECT: i32 = 3; // client disconnected from the server
pub const ERR_NEED_CD: i32 = 4;

pub const PRINT_ALL: i32 = 0;
pub const PRINT_DEVELOPER: i32 = 1; // only print when "developer 1"
pub const PRINT_WARNING: i32 = 2;
pub const PRINT_ERROR: i32 = 3;

// ============================================================
// Content flags
// ============================================================

// contents flags are separate bits
// a given brush can contribute multiple content bits

pub const CONTENTS_NONE: i32 = 0;
pub const CONTENTS_SOLID: i32 = 0x00000001; // Default setting. An eye is never valid in a solid
pub const CONTENTS_LAVA: i32 = 0x00000002;
pub const CONTENTS_WATER: i32 = 0x00000004;
pub const CONTENTS_FOG: i32 = 0x00000008;
pub const CONTENTS_PLAYERCLIP: i32 = 0x00000010;
pub const CONTENTS_MONSTERCLIP: i32 = 0x00000020;
pub const CONTENTS_BOTCLIP: i32 = 0x00000040;
pub const CONTENTS_SHOTCLIP: i32 = 0x00000080;
pub const CONTENTS_BODY: i32 = 0x00000100; // should never be on a brush, only in game
pub const CONTENTS_CORPSE: i32 = 0x00000200; // should never be on a brush, only in game
pub const CONTENTS_TRIGGER: i32 = 0x00000400;
pub const CONTENTS_NODROP: i32 = 0x00000800; // don't leave bodies or items (death fog, lava)
pub const CONTENTS_TERRAIN: i32 = 0x00001000; // volume contains terrain data
pub const CONTENTS_LADDER: i32 = 0x00002000;
pub const CONTENTS_ABSEIL: i32 = 0x00004000;
pub const CONTENTS_OPAQUE: i32 = 0x00008000; // defaults to on, when off, solid can be seen through
pub const CONTENTS_OUTSIDE: i32 = 0x00010000; // volume is considered to be in the outside (i.e. not indoors)
pub const CONTENTS_SLIME: i32 = 0x00020000; // don't be fooled. it may SAY "slime"...
pub const CONTENTS_LIGHTSABER: i32 = 0x00040000;
pub const CONTENTS_TELEPORTER: i32 = 0x00080000;
pub const CONTENTS_ITEM: i32 = 0x00100000;
pub const CONTENTS_NOSHOT: i32 = 0x00200000; // shots pass through me
pub const CONTENTS_DETAIL: i32 = 0x08000000; // brushes not used for the bsp
pub const CONTENTS_INSIDE: i32 = 0x10000000; // volume is considered to be inside (i.e. indoors)
pub const CONTENTS_TRANSLUCENT: i32 = 0x20000000; // don't consume surface fragments inside
pub const CONTENTS_STRUCTURAL: i32 = 0x40000000; // brushes used for the bsp

pub const MASK_ALL: i32 = -1;
pub const MASK_SOLID: i32 = CONTENTS_SOLID;
pub const MASK_PLAYERSOLID: i32 = CONTENTS_SOLID | CONTENTS_PLAYERCLIP | CONTENTS_BODY;
pub const MASK_NPCSOLID: i32 = CONTENTS_SOLID | CONTENTS_MONSTERCLIP | CONTENTS_BODY;
pub const MASK_DEADSOLID: i32 = CONTENTS_SOLID | CONTENTS_PLAYERCLIP;
pub const MASK_WATER: i32 = CONTENTS_WATER | CONTENTS_LAVA | CONTENTS_SLIME;
pub const MASK_OPAQUE: i32 = CONTENTS_SOLID | CONTENTS_SLIME | CONTENTS_LAVA;
pub const MASK_SHOT: i32 = CONTENTS_SOLID | CONTENTS_BODY | CONTENTS_CORPSE | CONTENTS_SHOTCLIP;

// ============================================================
// Collision plane / trace results
// ============================================================

/// cplane_t — plane side of a collision surface.
#[derive(Debug, Clone, Copy)]
pub struct CPlane {
    pub normal: Vec3,
    pub dist: f32,
    /// For fast side tests: 0, 1, 2 = axial, 3 = nonaxial.
    pub plane_type: u8,
    /// signx + (signy<<1) + (signz<<2), used as lookup during collision.
    pub signbits: u8,
    pub pad: [u8; 2],
}

impl Default for CPlane {
    fn default() -> Self {
        Self {
            normal: [0.0; 3],
            dist: 0.0,
            plane_type: 0,
            signbits: 0,
            pad: [0; 2],
        }
    }
}

/// trace_t — returned by a collision query. If `startsolid` is set, the
/// initial point was in a solid area; `fraction` tells how far the trace
/// got before hitting anything (1.0 = completed the full sweep).
#[derive(Debug, Clone)]
pub struct Trace {
    pub allsolid: bool,
    pub startsolid: bool,
    pub fraction: f32,
    pub endpos: Vec3,
    pub plane: CPlane,
    pub surface_flags: i32,
    pub contents: i32,
    pub entity_num: i32,
}

impl Default for Trace {
    fn default() -> Self {
        Self {
            allsolid: false,
            startsolid: false,
            fraction: 1.0,
            endpos: [0.0; 3],
            plane: CPlane::default(),
            surface_flags: 0,
            contents: 0,
            entity_num: ENTITYNUM_NONE,
        }
    }
}

// ============================================================
// Sound channels
// ============================================================

pub const CHAN_AUTO: i32 = 0; // engine picks the channel
pub const CHAN_LOCAL: i32 = 1; // menu sounds, etc
pub const CHAN_WEAPON: i32 = 2;
pub const CHAN_VOICE: i32 = 3; // voice sounds cause mouth animation
pub const CHAN_VOICE_ATTEN: i32 = 4; // attenuated voice
pub const CHAN_VOICE_GLOBAL: i32 = 5; // full-volume voice
pub const CHAN_ITEM: i32 = 6;
pub const CHAN_BODY: i32 = 7;
pub const CHAN_AMBIENT: i32 = 8;
pub const CHAN_LOCAL_SOUND: i32 = 9; // chat messages, etc
pub const CHAN_ANNOUNCER: i32 = 10; // announcer voices, etc

// ============================================================
// Teams, weapons, pmove flags
// ============================================================

/// team_t
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum Team {
    #[default]
    Free = 0,
    Red = 1,
    Blue = 2,
    Spectator = 3,
}

pub const WP_NONE: i32 = 0;
pub const WP_STUN_BATON: i32 = 1;
pub const WP_MELEE: i32 = 2;
pub const WP_SABER: i32 = 3;
pub const WP_BRYAR_PISTOL: i32 = 4;
pub const WP_BLASTER: i32 = 5;
pub const WP_DISRUPTOR: i32 = 6;
pub const WP_BOWCASTER: i32 = 7;
pub const WP_REPEATER: i32 = 8;
pub const WP_DEMP2: i32 = 9;
pub const WP_FLECHETTE: i32 = 10;
pub const WP_ROCKET_LAUNCHER: i32 = 11;
pub const WP_THERMAL: i32 = 12;
pub const WP_TRIP_MINE: i32 = 13;
pub const WP_DET_PACK: i32 = 14;
pub const WP_CONCUSSION: i32 = 15;
pub const WP_BRYAR_OLD: i32 = 16;
pub const WP_EMPLACED_GUN: i32 = 17;
pub const WP_TURRET: i32 = 18;
pub const WP_NUM_WEAPONS: i32 = 19;

/// Spectator chase-cam mode.
pub const PMF_FOLLOW: i32 = 1 << 12;

// ============================================================
// Renderer interface types
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum RefEntityType {
    #[default]
    Model = 0,
    Poly = 1,
    Sprite = 2,
    OrientedQuad = 3,
    Beam = 4,
    SaberGlow = 5,
    Electricity = 6,
    PortalSurface = 7, // doesn't draw anything, just info for portals
    Line = 8,
    OrientedLine = 9,
    Cylinder = 10,
    EntChain = 11,
}

bitflags::bitflags! {
    /// renderfx flags
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct RenderFx: i32 {
        const MINLIGHT        = 0x00000001; // always have some light (viewmodel, some items)
        const THIRD_PERSON    = 0x00000002; // don't draw through eyes, only mirrors
        const FIRST_PERSON    = 0x00000004; // only draw through eyes (view weapon, damage blood blob)
        const DEPTHHACK       = 0x00000008; // for view weapon Z crunching
        const NODEPTH         = 0x00000010; // no Z buffering
        const VOLUMETRIC      = 0x00000020; // fake volumetric shading
        const NOSHADOW        = 0x00000040; // don't add stencil shadows
        const LIGHTING_ORIGIN = 0x00000080; // use refEntity->lightingOrigin instead of refEntity->origin
        const SHADOW_PLANE    = 0x00000100; // use refEntity->shadowPlane
        const WRAP_FRAMES     = 0x00000200; // mod the model frames by the maxframes to allow continuous animation without needing to know the frame count
        const FORCE_ENT_ALPHA = 0x00000400; // override shader alpha settings
        const RGB_TINT        = 0x00000800; // override shader rgb settings
        const SHADOW_ONLY     = 0x00001000; // only draw the shadow
        const DISTORTION      = 0x00002000; // distortion effect
    }
}

pub const RF_MINLIGHT: RenderFx = RenderFx::MINLIGHT;
pub const RF_THIRD_PERSON: RenderFx = RenderFx::THIRD_PERSON;
pub const RF_FIRST_PERSON: RenderFx = RenderFx::FIRST_PERSON;
pub const RF_DEPTHHACK: RenderFx = RenderFx::DEPTHHACK;
pub const RF_NODEPTH: RenderFx = RenderFx::NODEPTH;
pub const RF_NOSHADOW: RenderFx = RenderFx::NOSHADOW;
pub const RF_FORCE_ENT_ALPHA: RenderFx = RenderFx::FORCE_ENT_ALPHA;
pub const RF_RGB_TINT: RenderFx = RenderFx::RGB_TINT;

/// refEntity_t — everything the renderer needs to draw one entity for one
/// frame. Zero-initialized like the C memset; the line width fields stand in
/// for the C data union (only the line payload survives in this port).
#[derive(Debug, Clone, Default)]
pub struct RefEntity {
    pub re_type: RefEntityType,
    pub renderfx: RenderFx,
    pub model: QHandle,

    pub axis: [Vec3; 3], // rotation vectors
    pub non_normalized_axes: bool, // axis are not normalized, i.e. they have scale
    pub origin: Vec3,
    pub frame: i32,

    pub old_origin: Vec3, // also used as the second point of RT_LINE

    // texturing
    pub custom_shader: QHandle, // use one image for the entire thing
    pub shader_rgba: [u8; 4], // colors used by rgbgen entity shaders
    pub shader_tex_coord: Vec2, // texture coordinates used by tcMod entity modifiers
    pub shader_time: f32, // subtracted from refdef time to control effect start times

    // extra sprite information
    pub radius: f32,
    pub rotation: f32,

    pub model_scale: Vec3, // axis scale for models
    pub line_width: f32, // RT_ORIENTEDLINE width
}

// ============================================================
// Trajectories
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum TrType {
    #[default]
    Stationary = 0,
    Interpolate = 1, // non-parametric, but interpolate between snapshots
    Linear = 2,
    LinearStop = 3,
    NonlinearStop = 4,
    Sine = 5, // value = base + sin( time / duration ) * delta
    Gravity = 6,
}

/// trajectory_t — parametric motion: evaluated analytically at any time
/// rather than integrated frame by frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trajectory {
    pub tr_type: TrType,
    pub tr_time: i32,
    pub tr_duration: i32, // if non 0, tr_time + tr_duration = stop time
    pub tr_base: Vec3,
    pub tr_delta: Vec3, // velocity, etc
}

// ============================================================
// Cvar flags
// ============================================================

pub const CVAR_NONE: i32 = 0x00000000;
pub const CVAR_ARCHIVE: i32 = 0x00000001; // save to the config file
pub const CVAR_USERINFO: i32 = 0x00000002; // sent to server on connect or change
pub const CVAR_SERVERINFO: i32 = 0x00000004; // sent in response to front end requests
pub const CVAR_SYSTEMINFO: i32 = 0x00000008; // these cvars will be duplicated on all clients
pub const CVAR_INIT: i32 = 0x00000010; // don't allow change from console at all
pub const CVAR_LATCH: i32 = 0x00000020; // only change on cvar update
pub const CVAR_ROM: i32 = 0x00000040; // display only, cannot be set by user at all
pub const CVAR_USER_CREATED: i32 = 0x00000080; // created by a set command
pub const CVAR_TEMP: i32 = 0x00000100; // can be set even when cheats are disabled, but is not archived
pub const CVAR_CHEAT: i32 = 0x00000200; // can not be changed if cheats are disabled
pub const CVAR_NORESTART: i32 = 0x00000400; // do not clear when a cvar_restart is issued
pub const CVAR_INTERNAL: i32 = 0x00000800; // cvar used exclusively in the engine

// ============================================================
// MATHLIB — Vector operations
// ============================================================

pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / std::f32::consts::PI;

#[inline]
pub fn dot_product(a: &Vec3, b: &Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn vector_subtract(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn vector_subtract_to(a: &Vec3, b: &Vec3, out: &mut Vec3) {
    out[0] = a[0] - b[0];
    out[1] = a[1] - b[1];
    out[2] = a[2] - b[2];
}

#[inline]
pub fn vector_add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn vector_copy(src: &Vec3) -> Vec3 {
    *src
}

#[inline]
pub fn vector_clear(v: &mut Vec3) {
    v[0] = 0.0;
    v[1] = 0.0;
    v[2] = 0.0;
}

#[inline]
pub fn vector_set(v: &mut Vec3, x: f32, y: f32, z: f32) {
    v[0] = x;
    v[1] = y;
    v[2] = z;
}

/// veca + scale * vecb
pub fn vector_ma(veca: &Vec3, scale: f32, vecb: &Vec3) -> Vec3 {
    [
        veca[0] + scale * vecb[0],
        veca[1] + scale * vecb[1],
        veca[2] + scale * vecb[2],
    ]
}

/// Write result into `out`: veca + scale * vecb
pub fn vector_ma_to(veca: &Vec3, scale: f32, vecb: &Vec3, out: &mut Vec3) {
    out[0] = veca[0] + scale * vecb[0];
    out[1] = veca[1] + scale * vecb[1];
    out[2] = veca[2] + scale * vecb[2];
}

pub fn vector_compare(v1: &Vec3, v2: &Vec3) -> bool {
    v1[0] == v2[0] && v1[1] == v2[1] && v1[2] == v2[2]
}

/// Normalize in place, returns original length.
pub fn vector_normalize(v: &mut Vec3) -> f32 {
    let length = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if length != 0.0 {
        let ilength = 1.0 / length;
        v[0] *= ilength;
        v[1] *= ilength;
        v[2] *= ilength;
    }
    length
}

pub fn vector_length(v: &Vec3) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

pub fn vector_length_squared(v: &Vec3) -> f32 {
    v[0] * v[0] + v[1] * v[1] + v[2] * v[2]
}

pub fn distance(p1: &Vec3, p2: &Vec3) -> f32 {
    vector_length(&vector_subtract(p2, p1))
}

pub fn vector_scale(v: &Vec3, scale: f32) -> Vec3 {
    [v[0] * scale, v[1] * scale, v[2] * scale]
}

pub fn vector_scale_to(v: &Vec3, scale: f32, out: &mut Vec3) {
    out[0] = v[0] * scale;
    out[1] = v[1] * scale;
    out[2] = v[2] * scale;
}

pub fn cross_product(v1: &Vec3, v2: &Vec3) -> Vec3 {
    [
        v1[1] * v2[2] - v1[2] * v2[1],
        v1[2] * v2[0] - v1[0] * v2[2],
        v1[0] * v2[1] - v1[1] * v2[0],
    ]
}

// ============================================================
// Matrix operations
// ============================================================

pub fn r_concat_rotations(in1: &[[f32; 3]; 3], in2: &[[f32; 3]; 3], out: &mut [[f32; 3]; 3]) {
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = in1[i][0] * in2[0][j] + in1[i][1] * in2[1][j] + in1[i][2] * in2[2][j];
        }
    }
}

// ============================================================
// Angle functions
// ============================================================

pub fn angle_vectors(
    angles: &Vec3,
    forward: Option<&mut Vec3>,
    right: Option<&mut Vec3>,
    up: Option<&mut Vec3>,
) {
    let angle_yaw = angles[YAW].to_radians();
    let sy = angle_yaw.sin();
    let cy = angle_yaw.cos();

    let angle_pitch = angles[PITCH].to_radians();
    let sp = angle_pitch.sin();
    let cp = angle_pitch.cos();

    let angle_roll = angles[ROLL].to_radians();
    let sr = angle_roll.sin();
    let cr = angle_roll.cos();

    if let Some(fwd) = forward {
        fwd[0] = cp * cy;
        fwd[1] = cp * sy;
        fwd[2] = -sp;
    }
    if let Some(r) = right {
        r[0] = -sr * sp * cy + -cr * -sy;
        r[1] = -sr * sp * sy + -cr * cy;
        r[2] = -sr * cp;
    }
    if let Some(u) = up {
        u[0] = cr * sp * cy + -sr * -sy;
        u[1] = cr * sp * sy + -sr * cy;
        u[2] = cr * cp;
    }
}

/// Convenience version of angle_vectors that returns a tuple (forward, right, up).
pub fn angle_vectors_tuple(angles: &Vec3) -> (Vec3, Vec3, Vec3) {
    let mut forward = [0.0f32; 3];
    let mut right = [0.0f32; 3];
    let mut up = [0.0f32; 3];
    angle_vectors(angles, Some(&mut forward), Some(&mut right), Some(&mut up));
    (forward, right, up)
}

/// vectoangles — converts a direction vector to Euler angles.
pub fn vectoangles(value1: &Vec3, angles: &mut Vec3) {
    if value1[1] == 0.0 && value1[0] == 0.0 {
        angles[YAW] = 0.0;
        angles[PITCH] = if value1[2] > 0.0 { -90.0 } else { -270.0 };
        angles[ROLL] = 0.0;
    } else {
        angles[YAW] = if value1[0] != 0.0 {
            value1[1].atan2(value1[0]) * RAD_TO_DEG
        } else if value1[1] > 0.0 {
            90.0
        } else {
            270.0
        };
        if angles[YAW] < 0.0 {
            angles[YAW] += 360.0;
        }

        let forward = (value1[0] * value1[0] + value1[1] * value1[1]).sqrt();
        angles[PITCH] = -(value1[2].atan2(forward) * RAD_TO_DEG);
        angles[ROLL] = 0.0;
    }
}

/// Build an orientation basis from Euler angles.
pub fn angles_to_axis(angles: &Vec3, axis: &mut [Vec3; 3]) {
    let mut forward = [0.0f32; 3];
    let mut right = [0.0f32; 3];
    let mut up = [0.0f32; 3];
    angle_vectors(angles, Some(&mut forward), Some(&mut right), Some(&mut up));
    axis[0] = forward;
    // angle_vectors returns "right" instead of a y axis
    axis[1] = vector_subtract(&vec3_origin, &right);
    axis[2] = up;
}

pub fn project_point_on_plane(dst: &mut Vec3, p: &Vec3, normal: &Vec3) {
    let inv_denom = 1.0 / dot_product(normal, normal);
    let d = dot_product(normal, p) * inv_denom;
    let n = [
        normal[0] * inv_denom,
        normal[1] * inv_denom,
        normal[2] * inv_denom,
    ];
    dst[0] = p[0] - d * n[0];
    dst[1] = p[1] - d * n[1];
    dst[2] = p[2] - d * n[2];
}

/// Find a vector perpendicular to `src` (assumed normalized).
pub fn perpendicular_vector(dst: &mut Vec3, src: &Vec3) {
    let mut min_elem: f32 = 1.0;
    let mut pos = 0;
    for i in 0..3 {
        if src[i].abs() < min_elem {
            pos = i;
            min_elem = src[i].abs();
        }
    }
    let mut tempvec = [0.0f32; 3];
    tempvec[pos] = 1.0;

    project_point_on_plane(dst, &tempvec, src);
    vector_normalize(dst);
}

pub fn rotate_point_around_vector(dst: &mut Vec3, dir: &Vec3, point: &Vec3, degrees: f32) {
    let vf = *dir;
    let mut vr = [0.0f32; 3];
    perpendicular_vector(&mut vr, dir);
    let vup = cross_product(&vr, &vf);

    let mut m = [[0.0f32; 3]; 3];
    m[0][0] = vr[0];
    m[1][0] = vr[1];
    m[2][0] = vr[2];
    m[0][1] = vup[0];
    m[1][1] = vup[1];
    m[2][1] = vup[2];
    m[0][2] = vf[0];
    m[1][2] = vf[1];
    m[2][2] = vf[2];

    let mut im = m;
    im[0][1] = m[1][0];
    im[0][2] = m[2][0];
    im[1][0] = m[0][1];
    im[1][2] = m[2][1];
    im[2][0] = m[0][2];
    im[2][1] = m[1][2];

    let rad = degrees.to_radians();
    let mut zrot = [[0.0f32; 3]; 3];
    zrot[2][2] = 1.0;
    zrot[0][0] = rad.cos();
    zrot[0][1] = rad.sin();
    zrot[1][0] = -rad.sin();
    zrot[1][1] = rad.cos();

    let mut tmpmat = [[0.0f32; 3]; 3];
    r_concat_rotations(&m, &zrot, &mut tmpmat);
    let mut rot = [[0.0f32; 3]; 3];
    r_concat_rotations(&tmpmat, &im, &mut rot);

    for i in 0..3 {
        dst[i] = rot[i][0] * point[0] + rot[i][1] * point[1] + rot[i][2] * point[2];
    }
}

/// Given a forward vector in axis[0], build an arbitrary perpendicular
/// axis[1] rotated by `yaw` degrees and complete the right-handed basis.
pub fn rotate_around_direction(axis: &mut [Vec3; 3], yaw: f32) {
    // create an arbitrary axis[1]
    let mut side = [0.0f32; 3];
    perpendicular_vector(&mut side, &axis[0]);

    // rotate it around axis[0] by yaw
    if yaw != 0.0 {
        let temp = side;
        let mut rotated = [0.0f32; 3];
        rotate_point_around_vector(&mut rotated, &axis[0], &temp, yaw);
        side = rotated;
    }
    axis[1] = side;

    // cross to get axis[2]
    axis[2] = cross_product(&axis[0], &axis[1]);
}

// ============================================================
// Random numbers
// ============================================================

/// Q_flrand — random float in [min, max).
pub fn q_flrand(min: f32, max: f32) -> f32 {
    min + rand::random::<f32>() * (max - min)
}

/// Q_irand — random integer in [min, max], inclusive on both ends.
pub fn q_irand(min: i32, max: i32) -> i32 {
    min + (rand::random::<f32>() * (max - min + 1) as f32) as i32
}

// ============================================================
// Unit tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "{} != {}", a, b);
    }

    fn assert_vec_near(a: &Vec3, b: &Vec3) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-4, "{:?} != {:?}", a, b);
        }
    }

    // ========== vector ops ==========

    #[test]
    fn test_dot_cross_orthogonal() {
        let x = [1.0, 0.0, 0.0];
        let y = [0.0, 1.0, 0.0];
        let z = cross_product(&x, &y);
        assert_vec_near(&z, &[0.0, 0.0, 1.0]);
        assert_near(dot_product(&x, &z), 0.0);
        assert_near(dot_product(&y, &z), 0.0);
    }

    #[test]
    fn test_vector_ma() {
        let base = [1.0, 2.0, 3.0];
        let dir = [0.0, 0.0, -1.0];
        assert_vec_near(&vector_ma(&base, 4.0, &dir), &[1.0, 2.0, -1.0]);
    }

    #[test]
    fn test_vector_normalize_returns_length() {
        let mut v = [3.0, 0.0, 4.0];
        let len = vector_normalize(&mut v);
        assert_near(len, 5.0);
        assert_near(vector_length(&v), 1.0);

        // zero vector stays zero
        let mut zero = [0.0, 0.0, 0.0];
        assert_near(vector_normalize(&mut zero), 0.0);
        assert_vec_near(&zero, &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_length_squared_matches_length() {
        let v = [2.0, -3.0, 6.0];
        assert_near(vector_length_squared(&v), 49.0);
        assert_near(vector_length(&v), 7.0);
        assert_near(distance(&[1.0, 1.0, 1.0], &[1.0, 1.0, 8.0]), 7.0);
    }

    // ========== angle math ==========

    #[test]
    fn test_vectoangles_cardinal_directions() {
        let mut angles = [0.0f32; 3];

        vectoangles(&[1.0, 0.0, 0.0], &mut angles);
        assert_vec_near(&angles, &[0.0, 0.0, 0.0]);

        vectoangles(&[0.0, 1.0, 0.0], &mut angles);
        assert_near(angles[YAW], 90.0);

        vectoangles(&[1.0, 1.0, 0.0], &mut angles);
        assert_near(angles[YAW], 45.0);

        // straight up keeps yaw zero
        vectoangles(&[0.0, 0.0, 1.0], &mut angles);
        assert_near(angles[PITCH], -90.0);
        assert_near(angles[YAW], 0.0);
    }

    #[test]
    fn test_angle_vectors_round_trip() {
        let mut angles = [0.0f32; 3];
        vectoangles(&[0.0, 1.0, 0.0], &mut angles);
        let (forward, _, _) = angle_vectors_tuple(&angles);
        assert_vec_near(&forward, &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_angle_vectors_orthonormal() {
        let angles = [30.0, 120.0, -45.0];
        let (forward, right, up) = angle_vectors_tuple(&angles);
        assert_near(vector_length(&forward), 1.0);
        assert_near(vector_length(&right), 1.0);
        assert_near(vector_length(&up), 1.0);
        assert_near(dot_product(&forward, &right), 0.0);
        assert_near(dot_product(&forward, &up), 0.0);
        assert_near(dot_product(&right, &up), 0.0);
    }

    #[test]
    fn test_angles_to_axis_identity() {
        let mut axis = [[0.0f32; 3]; 3];
        angles_to_axis(&[0.0, 0.0, 0.0], &mut axis);
        assert_vec_near(&axis[0], &[1.0, 0.0, 0.0]);
        assert_vec_near(&axis[1], &[0.0, 1.0, 0.0]);
        assert_vec_near(&axis[2], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_rotate_around_direction_basis() {
        for yaw in [0.0f32, 45.0, 90.0, 213.5] {
            let mut axis = [[0.0f32; 3]; 3];
            axis[0] = [0.0, 0.0, 1.0];
            rotate_around_direction(&mut axis, yaw);
            assert_near(dot_product(&axis[0], &axis[1]), 0.0);
            assert_near(dot_product(&axis[0], &axis[2]), 0.0);
            assert_near(dot_product(&axis[1], &axis[2]), 0.0);
            assert_near(vector_length(&axis[1]), 1.0);
            assert_near(vector_length(&axis[2]), 1.0);
        }
    }

    #[test]
    fn test_rotate_point_around_vector_quarter_turn() {
        let mut dst = [0.0f32; 3];
        rotate_point_around_vector(&mut dst, &[0.0, 0.0, 1.0], &[1.0, 0.0, 0.0], 90.0);
        // quarter turn around +z maps +x onto -y or +y depending on handedness;
        // either way it stays in the xy plane with unit length
        assert_near(dst[2], 0.0);
        assert_near(vector_length(&dst), 1.0);
        assert_near(dst[0], 0.0);
    }

    #[test]
    fn test_perpendicular_vector() {
        let dirs = [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.577, 0.577, 0.577]];
        for dir in &dirs {
            let mut perp = [0.0f32; 3];
            perpendicular_vector(&mut perp, dir);
            assert_near(dot_product(&perp, dir), 0.0);
            assert_near(vector_length(&perp), 1.0);
        }
    }

    // ========== structures / constants ==========

    #[test]
    fn test_trace_default_is_full_sweep() {
        let tr = Trace::default();
        assert!(!tr.allsolid);
        assert!(!tr.startsolid);
        assert_eq!(tr.fraction, 1.0);
        assert_eq!(tr.entity_num, ENTITYNUM_NONE);
    }

    #[test]
    fn test_ref_entity_default_is_zeroed() {
        let re = RefEntity::default();
        assert_eq!(re.re_type, RefEntityType::Model);
        assert!(re.renderfx.is_empty());
        assert_eq!(re.axis, [[0.0; 3]; 3]);
        assert_eq!(re.shader_rgba, [0, 0, 0, 0]);
    }

    #[test]
    fn test_renderfx_values() {
        assert_eq!(RF_NODEPTH.bits(), 0x10);
        assert_eq!(RF_FORCE_ENT_ALPHA.bits(), 0x400);
    }

    #[test]
    fn test_entity_numbers() {
        assert_eq!(MAX_GENTITIES, 1024);
        assert_eq!(ENTITYNUM_WORLD, 1022);
        assert_eq!(ENTITYNUM_NONE, 1023);
    }

    #[test]
    fn test_trajectory_default_is_stationary() {
        let tr = Trajectory::default();
        assert_eq!(tr.tr_type, TrType::Stationary);
        assert_eq!(tr.tr_base, [0.0; 3]);
    }

    // ========== random helpers ==========

    #[test]
    fn test_q_irand_inclusive_bounds() {
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2000 {
            let v = q_irand(0, 3);
            assert!(v >= 0 && v <= 3);
            if v == 0 {
                seen_min = true;
            }
            if v == 3 {
                seen_max = true;
            }
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn test_q_flrand_range() {
        for _ in 0..1000 {
            let v = q_flrand(-1.0, 1.0);
            assert!(v >= -1.0 && v < 1.0);
        }
    }
}
