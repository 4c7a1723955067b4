// SPDX-License-Identifier: AGPL-3.0-or-later

//! The Graph Projector (§4.5): turns one canonical release bundle into a
//! set of node upserts, typed edges, and creation claims, all inside a
//! single [`GraphTransaction`] that either fully commits or fully rolls
//! back. Processing order is fixed (groups, release, songs, tracks,
//! tracklist, labels/master, sources) so that later steps can rely on
//! earlier ones having already resolved their entities.

mod ids;
mod position;

use std::collections::HashMap;

use discograph_core::{
    claim::{Claim, ClaimValue},
    entity::{
        city::City, group::Group, label::Label, master::Master, person::Person,
        release::Release, song::Song, track::Track, EntityKind, Id, IdKind, NodeHeader,
    },
    identity::{
        self,
        fingerprint::{make_provisional_id, Fingerprint},
        ParsedId,
    },
    relationship::{GuestScope, LineupSource},
    util::clock::Timestamp,
};
use discograph_core_json::canonical::{
    CanonicalBundle, CanonicalCity, CanonicalCredit, CanonicalGroup, CanonicalPerformingGroup,
    CanonicalTrack, CanonicalWriterCredit,
};
use discograph_repo::{
    graph::{EdgeKind, EdgeUpsert, GraphStore, GraphTransaction},
    identity_map::IdentityMapStore,
};
use serde::Serialize;
use serde_json::{json, Value};

/// Serializes an entity struct and drops its embedded `header` field: the
/// repo contract stores a node's header and its attributes separately
/// ([`GraphTransaction::upsert_node`]), while every typed entity struct in
/// `discograph_core::entity` embeds `header` for in-process validation.
fn attributes_of<T: Serialize>(entity: &T) -> Value {
    let mut value = serde_json::to_value(entity).expect("entity struct serializes to JSON");
    if let Value::Object(map) = &mut value {
        map.remove("header");
    }
    value
}

use self::{
    ids::{resolve_entity_id, OpCounter},
    position::parse_position,
};
use crate::Result;

#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionOutcome {
    pub release_id: Id,
    pub created_node_count: usize,
    pub edge_count: usize,
    pub claim_count: usize,
}

#[derive(Default)]
struct Counters {
    nodes: usize,
    edges: usize,
    claims: usize,
}

/// One release-level lineup member, remembered by [`project_groups`] for
/// the derived-membership fallback in [`project_tracks`].
#[derive(Clone)]
struct LineupMember {
    person_id: Id,
    roles: Vec<String>,
    instruments: Vec<String>,
}

#[derive(Default)]
struct ReleaseLineup {
    by_id: HashMap<String, Vec<LineupMember>>,
    by_name: HashMap<String, Vec<LineupMember>>,
}

/// Projects `bundle` into the graph as one atomic transaction, per §4.5.
pub async fn project_bundle(
    graph: &dyn GraphStore,
    identity_map: &dyn IdentityMapStore,
    event_hash: &str,
    bundle: &CanonicalBundle,
    submitter: &str,
    event_ts: Timestamp,
) -> Result<ProjectionOutcome> {
    let mut txn = graph.begin_transaction().await?;
    match project_inner(&mut *txn, identity_map, event_hash, bundle, submitter, event_ts).await {
        Ok(outcome) => {
            txn.commit().await?;
            Ok(outcome)
        }
        Err(err) => {
            txn.rollback().await?;
            Err(err)
        }
    }
}

async fn project_inner(
    txn: &mut dyn GraphTransaction,
    identity_map: &dyn IdentityMapStore,
    event_hash: &str,
    bundle: &CanonicalBundle,
    submitter: &str,
    event_ts: Timestamp,
) -> Result<ProjectionOutcome> {
    let mut counter = OpCounter::new(event_hash);
    let mut counters = Counters::default();
    let mut lineup = ReleaseLineup::default();

    // Step 1: groups.
    let mut group_ids_by_input_id: HashMap<String, Id> = HashMap::new();
    for group in &bundle.groups {
        let group_id = project_group(
            txn,
            identity_map,
            &mut counter,
            &mut counters,
            group,
            event_hash,
            event_ts,
            &mut lineup,
        )
        .await?;
        if let Some(input_id) = &group.group_id {
            group_ids_by_input_id.insert(input_id.clone(), group_id);
        }
    }

    // Step 2: release.
    let release_id = project_release(
        txn,
        &mut counter,
        &mut counters,
        bundle,
        submitter,
        event_hash,
        event_ts,
    )
    .await?;

    // Step 3: songs.
    let mut song_ids_by_title: HashMap<String, Id> = HashMap::new();
    for song in &bundle.songs {
        let fingerprint = Fingerprint::song(&song.title, song.writers.first().map(|w| w.name.as_str()));
        let resolved =
            resolve_entity_id(identity_map, EntityKind::Song, None, &fingerprint).await?;
        let header = NodeHeader::new(EntityKind::Song, resolved.id.clone(), resolved.id_kind);
        let mut entity = Song::new(header.clone(), song.title.as_str());
        entity.alt_titles.clone_from(&song.alt_titles);
        entity.iswc.clone_from(&song.iswc);
        entity.year = song.year;
        entity.lyrics.clone_from(&song.lyrics);
        let is_new = txn.upsert_node(header, attributes_of(&entity)).await?;
        if is_new {
            counters.nodes += 1;
            record_creation_claim(
                txn,
                &mut counter,
                &mut counters,
                EntityKind::Song,
                &resolved.id,
                "title",
                json!(song.title),
                event_hash,
                event_ts,
            )
            .await?;
        }
        song_ids_by_title.insert(song.title.to_ascii_lowercase(), resolved.id.clone());

        for writer in &song.writers {
            let person_id = project_person_credit(
                txn,
                identity_map,
                &mut counter,
                &mut counters,
                &writer.name,
                writer.person_id.as_deref(),
                event_hash,
                event_ts,
            )
            .await?;
            write_wrote_edge(txn, &mut counters, &person_id, &resolved.id, writer).await?;
        }
    }

    // Step 4: tracks.
    let mut track_ids: HashMap<String, Id> = HashMap::new();
    for track in &bundle.tracks {
        track_ids.insert(track.track_id.clone(), Id::new(track.track_id.clone()));
    }
    for track in &bundle.tracks {
        project_track(
            txn,
            identity_map,
            &mut counter,
            &mut counters,
            track,
            &lineup,
            &group_ids_by_input_id,
            &song_ids_by_title,
            &track_ids,
            event_hash,
            event_ts,
        )
        .await?;
    }

    // Step 5: tracklist.
    for (index, item) in bundle.tracklist.iter().enumerate() {
        let parsed = parse_position(&item.position, index);
        let track_id = Id::new(item.track_id.clone());
        let properties = json!({
            "position": item.position,
            "disc_number": parsed.disc_number,
            "track_number": parsed.track_number,
            "side": parsed.side.map(|c| c.to_string()),
            "is_bonus": false,
        });
        txn.upsert_edge(EdgeUpsert {
            from_kind: EntityKind::Track,
            from_id: track_id,
            kind: EdgeKind::InRelease,
            to_kind: EntityKind::Release,
            to_id: release_id.clone(),
            properties,
        })
        .await?;
        counters.edges += 1;
    }

    // Step 6: labels and master.
    let mut label_ids = Vec::with_capacity(bundle.release.labels.len());
    for label in &bundle.release.labels {
        let fingerprint = Fingerprint::named(&label.name);
        let resolved =
            resolve_entity_id(identity_map, EntityKind::Label, None, &fingerprint).await?;
        let parent_label_id = if let Some(parent_name) = &label.parent_label {
            let parent_fingerprint = Fingerprint::named(parent_name);
            let parent = resolve_entity_id(identity_map, EntityKind::Label, None, &parent_fingerprint).await?;
            let parent_header = NodeHeader::new(EntityKind::Label, parent.id.clone(), parent.id_kind);
            let parent_entity = Label::new(parent_header.clone(), parent_name.as_str());
            let is_new = txn
                .upsert_node(parent_header, attributes_of(&parent_entity))
                .await?;
            if is_new {
                counters.nodes += 1;
            }
            Some(parent.id)
        } else {
            None
        };
        let origin_city_id = match &label.origin_city {
            Some(city) => Some(
                project_city(txn, identity_map, &mut counter, &mut counters, city, event_hash, event_ts).await?,
            ),
            None => None,
        };
        let header = NodeHeader::new(EntityKind::Label, resolved.id.clone(), resolved.id_kind);
        let mut entity = Label::new(header.clone(), label.name.as_str());
        entity.parent_label = parent_label_id;
        entity.origin_city = origin_city_id;
        let is_new = txn.upsert_node(header, attributes_of(&entity)).await?;
        if is_new {
            counters.nodes += 1;
            record_creation_claim(
                txn,
                &mut counter,
                &mut counters,
                EntityKind::Label,
                &resolved.id,
                "name",
                json!(label.name),
                event_hash,
                event_ts,
            )
            .await?;
        }
        txn.upsert_edge(EdgeUpsert {
            from_kind: EntityKind::Label,
            from_id: resolved.id.clone(),
            kind: EdgeKind::Released,
            to_kind: EntityKind::Release,
            to_id: release_id.clone(),
            properties: Value::Null,
        })
        .await?;
        counters.edges += 1;
        label_ids.push(resolved.id);
    }

    let mut master_id = None;
    if let Some(master_name) = &bundle.release.master {
        let fingerprint = Fingerprint::named(master_name);
        let resolved =
            resolve_entity_id(identity_map, EntityKind::Master, None, &fingerprint).await?;
        let header = NodeHeader::new(EntityKind::Master, resolved.id.clone(), resolved.id_kind);
        let entity = Master::new(header.clone(), master_name.as_str());
        let is_new = txn.upsert_node(header, attributes_of(&entity)).await?;
        if is_new {
            counters.nodes += 1;
            record_creation_claim(
                txn,
                &mut counter,
                &mut counters,
                EntityKind::Master,
                &resolved.id,
                "name",
                json!(master_name),
                event_hash,
                event_ts,
            )
            .await?;
        }
        txn.upsert_edge(EdgeUpsert {
            from_kind: EntityKind::Release,
            from_id: release_id.clone(),
            kind: EdgeKind::InMaster,
            to_kind: EntityKind::Master,
            to_id: resolved.id.clone(),
            properties: Value::Null,
        })
        .await?;
        counters.edges += 1;
        master_id = Some(resolved.id);
    }

    if !label_ids.is_empty() || master_id.is_some() {
        // A partial update, not a full `Release` snapshot: `upsert_node`
        // overwrites whatever fields `attributes` supplies, so this must
        // name only `labels`/`master` rather than round-trip the whole
        // entity (which would null out fields set by `project_release`).
        let release_header = NodeHeader::new(EntityKind::Release, release_id.clone(), IdKind::Provisional);
        txn.upsert_node(
            release_header,
            json!({ "labels": label_ids, "master": master_id }),
        )
        .await?;
    }

    // Step 7: sources. §4.5 names a `SOURCED_FROM` edge kind, but `Source`
    // is not a claim/merge-whitelisted entity kind (§3) and so has no
    // `NodeHeader`; bundle-level sources are attached as release provenance
    // metadata instead of graph nodes (see DESIGN.md).
    if !bundle.sources.is_empty() {
        let sources: Vec<Value> = bundle
            .sources
            .iter()
            .map(|source| {
                json!({
                    "url": source.url,
                    "source_type": source.source_type,
                    "accessed_at": source.accessed_at,
                })
            })
            .collect();
        txn.upsert_node(
            NodeHeader::new(EntityKind::Release, release_id.clone(), IdKind::Provisional),
            json!({ "sources": sources }),
        )
        .await?;
    }

    Ok(ProjectionOutcome {
        release_id,
        created_node_count: counters.nodes,
        edge_count: counters.edges,
        claim_count: counters.claims,
    })
}

async fn project_group(
    txn: &mut dyn GraphTransaction,
    identity_map: &dyn IdentityMapStore,
    counter: &mut OpCounter<'_>,
    counters: &mut Counters,
    group: &CanonicalGroup,
    event_hash: &str,
    event_ts: Timestamp,
    lineup: &mut ReleaseLineup,
) -> Result<Id> {
    let fingerprint = Fingerprint::group(&group.name);
    let resolved = resolve_entity_id(
        identity_map,
        EntityKind::Group,
        group.group_id.as_deref(),
        &fingerprint,
    )
    .await?;

    let origin_city_id = match &group.origin_city {
        Some(city) => Some(
            project_city(txn, identity_map, counter, counters, city, event_hash, event_ts).await?,
        ),
        None => None,
    };

    let mut header = NodeHeader::new(EntityKind::Group, resolved.id.clone(), resolved.id_kind);
    header.external_ref = resolved.external_ref.clone();
    let mut entity = Group::new(header.clone(), group.name.as_str());
    entity.alt_names.clone_from(&group.alt_names);
    entity.bio.clone_from(&group.bio);
    entity.formed_date.clone_from(&group.formed_date);
    entity.disbanded_date.clone_from(&group.disbanded_date);
    entity.origin_city = origin_city_id.clone();
    let is_new = txn.upsert_node(header, attributes_of(&entity)).await?;
    if is_new {
        counters.nodes += 1;
        record_creation_claim(
            txn,
            counter,
            counters,
            EntityKind::Group,
            &resolved.id,
            "name",
            json!(group.name),
            event_hash,
            event_ts,
        )
        .await?;
    }

    if let Some(city_id) = &origin_city_id {
        txn.upsert_edge(EdgeUpsert {
            from_kind: EntityKind::Group,
            from_id: resolved.id.clone(),
            kind: EdgeKind::Origin,
            to_kind: EntityKind::City,
            to_id: city_id.clone(),
            properties: Value::Null,
        })
        .await?;
        counters.edges += 1;
    }

    let mut members = Vec::with_capacity(group.members.len());
    for member in &group.members {
        let person_id = project_person_credit(
            txn,
            identity_map,
            counter,
            counters,
            &member.name,
            member.person_id.as_deref(),
            event_hash,
            event_ts,
        )
        .await?;
        let properties = json!({
            "from_date": member.from_date,
            "to_date": member.to_date,
            "role": Value::Null,
            "roles": member.roles,
            "instruments": member.instruments,
        });
        txn.upsert_edge(EdgeUpsert {
            from_kind: EntityKind::Person,
            from_id: person_id.clone(),
            kind: EdgeKind::MemberOf,
            to_kind: EntityKind::Group,
            to_id: resolved.id.clone(),
            properties,
        })
        .await?;
        counters.edges += 1;
        members.push(LineupMember {
            person_id,
            roles: member.roles.clone(),
            instruments: member.instruments.clone(),
        });
    }
    if let Some(input_id) = &group.group_id {
        lineup.by_id.insert(input_id.clone(), members.clone());
    }
    lineup
        .by_id
        .insert(resolved.id.as_str().to_owned(), members.clone());
    lineup
        .by_name
        .insert(group.name.to_ascii_lowercase(), members);

    Ok(resolved.id)
}

async fn project_release(
    txn: &mut dyn GraphTransaction,
    counter: &mut OpCounter<'_>,
    counters: &mut Counters,
    bundle: &CanonicalBundle,
    submitter: &str,
    event_hash: &str,
    event_ts: Timestamp,
) -> Result<Id> {
    let fingerprint = Fingerprint::release(
        &bundle.release.name,
        bundle.release.release_date.as_deref(),
        bundle.release.catalog_number.as_deref(),
    );
    let release_id = Id::new(make_provisional_id(EntityKind::Release, &fingerprint));

    let header = NodeHeader::new(EntityKind::Release, release_id.clone(), IdKind::Provisional);
    let mut entity = Release::new(header.clone(), bundle.release.name.as_str());
    entity.release_date.clone_from(&bundle.release.release_date);
    entity.format.clone_from(&bundle.release.format);
    entity.country.clone_from(&bundle.release.country);
    entity.catalog_number.clone_from(&bundle.release.catalog_number);
    entity.album_art.clone_from(&bundle.release.album_art);
    entity.notes.clone_from(&bundle.release.notes);
    let submission = discograph_core::relationship::Submitted {
        event_hash: event_hash.to_owned(),
        timestamp: event_ts,
    };
    let mut attributes = attributes_of(&entity);
    if let Value::Object(map) = &mut attributes {
        map.insert("submitted_by".to_owned(), json!(submitter));
        map.insert("submission".to_owned(), json!(submission));
    }
    let is_new = txn.upsert_node(header, attributes).await?;
    if is_new {
        counters.nodes += 1;
        record_creation_claim(
            txn,
            counter,
            counters,
            EntityKind::Release,
            &release_id,
            "name",
            json!(bundle.release.name),
            event_hash,
            event_ts,
        )
        .await?;
    }

    for guest in &bundle.release.guests {
        let person_id = project_person_credit(
            txn,
            &NoopIdentityMap,
            counter,
            counters,
            &guest.name,
            guest.person_id.as_deref(),
            event_hash,
            event_ts,
        )
        .await?;
        write_guest_edge(
            txn,
            counters,
            &person_id,
            EntityKind::Release,
            &release_id,
            guest,
            GuestScope::Release,
        )
        .await?;
    }

    Ok(release_id)
}

#[allow(clippy::too_many_arguments)]
async fn project_track(
    txn: &mut dyn GraphTransaction,
    identity_map: &dyn IdentityMapStore,
    counter: &mut OpCounter<'_>,
    counters: &mut Counters,
    track: &CanonicalTrack,
    lineup: &ReleaseLineup,
    group_ids_by_input_id: &HashMap<String, Id>,
    song_ids_by_title: &HashMap<String, Id>,
    track_ids: &HashMap<String, Id>,
    event_hash: &str,
    event_ts: Timestamp,
) -> Result<()> {
    let track_id = Id::new(track.track_id.clone());
    let header = NodeHeader::new(EntityKind::Track, track_id.clone(), IdKind::Provisional);
    let mut entity = Track::new(header.clone(), track.title.as_str());
    entity.duration = track.duration.map(|seconds| seconds.round() as u32);
    entity.isrc.clone_from(&track.isrc);
    entity.recording_date.clone_from(&track.recording_date);
    entity.location.clone_from(&track.location);
    entity.listen_links.clone_from(&track.listen_links);
    let is_new = txn.upsert_node(header, attributes_of(&entity)).await?;
    if is_new {
        counters.nodes += 1;
        record_creation_claim(
            txn,
            counter,
            counters,
            EntityKind::Track,
            &track_id,
            "title",
            json!(track.title),
            event_hash,
            event_ts,
        )
        .await?;
    }

    for performing_group in &track.performed_by_groups {
        project_track_performing_group(
            txn,
            identity_map,
            counter,
            counters,
            &track_id,
            performing_group,
            lineup,
            group_ids_by_input_id,
            event_hash,
            event_ts,
        )
        .await?;
    }

    for guest in &track.guests {
        let person_id = project_person_credit(
            txn,
            identity_map,
            counter,
            counters,
            &guest.name,
            guest.person_id.as_deref(),
            event_hash,
            event_ts,
        )
        .await?;
        write_guest_edge(
            txn,
            counters,
            &person_id,
            EntityKind::Track,
            &track_id,
            guest,
            GuestScope::Track,
        )
        .await?;
    }

    for producer in &track.producers {
        let person_id = project_person_credit(
            txn,
            identity_map,
            counter,
            counters,
            &producer.name,
            producer.person_id.as_deref(),
            event_hash,
            event_ts,
        )
        .await?;
        txn.upsert_edge(EdgeUpsert {
            from_kind: EntityKind::Person,
            from_id: person_id,
            kind: EdgeKind::Produced,
            to_kind: EntityKind::Track,
            to_id: track_id.clone(),
            properties: json!({ "role": producer.roles.first() }),
        })
        .await?;
        counters.edges += 1;
    }

    for arranger in &track.arrangers {
        let person_id = project_person_credit(
            txn,
            identity_map,
            counter,
            counters,
            &arranger.name,
            arranger.person_id.as_deref(),
            event_hash,
            event_ts,
        )
        .await?;
        txn.upsert_edge(EdgeUpsert {
            from_kind: EntityKind::Person,
            from_id: person_id,
            kind: EdgeKind::Arranged,
            to_kind: EntityKind::Track,
            to_id: track_id.clone(),
            properties: json!({ "role": arranger.roles.first() }),
        })
        .await?;
        counters.edges += 1;
    }

    if let Some(recording_of) = &track.recording_of {
        if let Some(song_id) = resolve_song_reference(counter, song_ids_by_title, recording_of) {
            txn.upsert_edge(EdgeUpsert {
                from_kind: EntityKind::Track,
                from_id: track_id.clone(),
                kind: EdgeKind::RecordingOf,
                to_kind: EntityKind::Song,
                to_id: song_id,
                properties: Value::Null,
            })
            .await?;
            counters.edges += 1;
        }
    }

    if let Some(cover_of) = &track.cover_of {
        if let Some(target) = resolve_track_reference(cover_of, track_ids) {
            txn.upsert_edge(EdgeUpsert {
                from_kind: EntityKind::Track,
                from_id: track_id.clone(),
                kind: EdgeKind::CoverOf,
                to_kind: EntityKind::Track,
                to_id: target,
                properties: Value::Null,
            })
            .await?;
            counters.edges += 1;
        } else {
            tracing::debug!(cover_of, "cover_of does not reference a known track; skipping edge");
        }
    }

    for sample in &track.samples {
        let Some(sampled_track_id) = &sample.track_id else {
            tracing::debug!("sample has no track_id; skipping edge");
            continue;
        };
        let Some(target) = resolve_track_reference(sampled_track_id, track_ids) else {
            tracing::debug!(sampled_track_id, "sample track_id does not reference a known track; skipping edge");
            continue;
        };
        txn.upsert_edge(EdgeUpsert {
            from_kind: EntityKind::Track,
            from_id: track_id.clone(),
            kind: EdgeKind::Samples,
            to_kind: EntityKind::Track,
            to_id: target,
            properties: json!({
                "portion_used": sample.portion_used,
                "cleared": sample.cleared,
                "source": sample.source,
            }),
        })
        .await?;
        counters.edges += 1;
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn project_track_performing_group(
    txn: &mut dyn GraphTransaction,
    identity_map: &dyn IdentityMapStore,
    counter: &mut OpCounter<'_>,
    counters: &mut Counters,
    track_id: &Id,
    performing_group: &CanonicalPerformingGroup,
    lineup: &ReleaseLineup,
    group_ids_by_input_id: &HashMap<String, Id>,
    event_hash: &str,
    event_ts: Timestamp,
) -> Result<()> {
    let group_id = match (&performing_group.group_id, &performing_group.name) {
        (Some(input_id), _) if group_ids_by_input_id.contains_key(input_id) => {
            group_ids_by_input_id[input_id].clone()
        }
        (Some(explicit), _) => Id::new(explicit.clone()),
        (None, Some(name)) => {
            let fingerprint = Fingerprint::group(name);
            resolve_entity_id(identity_map, EntityKind::Group, None, &fingerprint)
                .await?
                .id
        }
        (None, None) => return Ok(()),
    };

    txn.upsert_edge(EdgeUpsert {
        from_kind: EntityKind::Group,
        from_id: group_id.clone(),
        kind: EdgeKind::PerformedOn,
        to_kind: EntityKind::Track,
        to_id: track_id.clone(),
        properties: json!({
            "role": performing_group.role,
            "credited_as": performing_group.credited_as,
        }),
    })
    .await?;
    counters.edges += 1;

    if !performing_group.members.is_empty() {
        for member in &performing_group.members {
            let person_id = project_person_credit(
                txn,
                identity_map,
                counter,
                counters,
                &member.name,
                member.person_id.as_deref(),
                event_hash,
                event_ts,
            )
            .await?;
            write_performed_on_edge(
                txn,
                counters,
                &person_id,
                track_id,
                &group_id,
                &member.roles,
                &member.instruments,
                false,
                LineupSource::TrackExplicit,
            )
            .await?;
        }
        return Ok(());
    }

    if performing_group.members_are_complete {
        // An explicit, deliberately empty lineup for this track: no
        // derived fallback.
        return Ok(());
    }

    let (members, source) = if let Some(members) = lineup.by_id.get(group_id.as_str()) {
        (members, LineupSource::ReleaseDefault)
    } else if let Some(name) = &performing_group.name {
        match lineup.by_name.get(&name.to_ascii_lowercase()) {
            Some(members) => (members, LineupSource::ReleaseDefaultByName),
            None => return Ok(()),
        }
    } else {
        return Ok(());
    };

    for member in members.clone() {
        write_performed_on_edge(
            txn,
            counters,
            &member.person_id,
            track_id,
            &group_id,
            &member.roles,
            &member.instruments,
            true,
            source,
        )
        .await?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn write_performed_on_edge(
    txn: &mut dyn GraphTransaction,
    counters: &mut Counters,
    person_id: &Id,
    track_id: &Id,
    via_group_id: &Id,
    roles: &[String],
    instruments: &[String],
    derived: bool,
    lineup_source: LineupSource,
) -> Result<()> {
    txn.upsert_edge(EdgeUpsert {
        from_kind: EntityKind::Person,
        from_id: person_id.clone(),
        kind: EdgeKind::PerformedOn,
        to_kind: EntityKind::Track,
        to_id: track_id.clone(),
        properties: json!({
            "derived": derived,
            "via_group_id": via_group_id.as_str(),
            "roles": roles,
            "role": Value::Null,
            "instruments": instruments,
            "lineup_source": lineup_source,
        }),
    })
    .await?;
    counters.edges += 1;
    Ok(())
}

async fn write_guest_edge(
    txn: &mut dyn GraphTransaction,
    counters: &mut Counters,
    person_id: &Id,
    to_kind: EntityKind,
    to_id: &Id,
    guest: &CanonicalCredit,
    scope: GuestScope,
) -> Result<()> {
    txn.upsert_edge(EdgeUpsert {
        from_kind: EntityKind::Person,
        from_id: person_id.clone(),
        kind: EdgeKind::GuestOn,
        to_kind,
        to_id: to_id.clone(),
        properties: json!({
            "roles": guest.roles,
            "role": Value::Null,
            "role_detail": guest.role_detail,
            "instruments": guest.instruments,
            "credited_as": guest.credited_as,
            "scope": scope,
        }),
    })
    .await?;
    counters.edges += 1;
    Ok(())
}

async fn write_wrote_edge(
    txn: &mut dyn GraphTransaction,
    counters: &mut Counters,
    person_id: &Id,
    song_id: &Id,
    writer: &CanonicalWriterCredit,
) -> Result<()> {
    let share_percentage_bp = writer
        .share_percentage
        .map(|pct| (pct * 100.0).round() as u32);
    txn.upsert_edge(EdgeUpsert {
        from_kind: EntityKind::Person,
        from_id: person_id.clone(),
        kind: EdgeKind::Wrote,
        to_kind: EntityKind::Song,
        to_id: song_id.clone(),
        properties: json!({
            "role": Value::Null,
            "roles": writer.roles,
            "role_detail": writer.role_detail,
            "credited_as": writer.credited_as,
            "share_percentage_bp": share_percentage_bp,
        }),
    })
    .await?;
    counters.edges += 1;
    Ok(())
}

async fn project_person_credit(
    txn: &mut dyn GraphTransaction,
    identity_map: &dyn IdentityMapStore,
    counter: &mut OpCounter<'_>,
    counters: &mut Counters,
    name: &str,
    person_id: Option<&str>,
    event_hash: &str,
    event_ts: Timestamp,
) -> Result<Id> {
    let fingerprint = Fingerprint::person(name, None);
    let resolved = resolve_entity_id(identity_map, EntityKind::Person, person_id, &fingerprint).await?;
    let mut header = NodeHeader::new(EntityKind::Person, resolved.id.clone(), resolved.id_kind);
    header.external_ref = resolved.external_ref.clone();
    let entity = Person::new(header.clone(), name);
    let is_new = txn.upsert_node(header, attributes_of(&entity)).await?;
    if is_new {
        counters.nodes += 1;
        record_creation_claim(
            txn,
            counter,
            counters,
            EntityKind::Person,
            &resolved.id,
            "name",
            json!(name),
            event_hash,
            event_ts,
        )
        .await?;
    }
    Ok(resolved.id)
}

async fn project_city(
    txn: &mut dyn GraphTransaction,
    identity_map: &dyn IdentityMapStore,
    counter: &mut OpCounter<'_>,
    counters: &mut Counters,
    city: &CanonicalCity,
    event_hash: &str,
    event_ts: Timestamp,
) -> Result<Id> {
    let fingerprint = Fingerprint::city(&city.name, city.latitude, city.longitude);
    let resolved = resolve_entity_id(identity_map, EntityKind::City, None, &fingerprint).await?;
    let header = NodeHeader::new(EntityKind::City, resolved.id.clone(), resolved.id_kind);
    let mut entity = City::new(header.clone(), city.name.as_str());
    if let (Some(lat), Some(lon)) = (city.latitude, city.longitude) {
        entity = entity.with_coordinates(lat, lon);
    }
    let is_new = txn.upsert_node(header, attributes_of(&entity)).await?;
    if is_new {
        counters.nodes += 1;
        record_creation_claim(
            txn,
            counter,
            counters,
            EntityKind::City,
            &resolved.id,
            "name",
            json!(city.name),
            event_hash,
            event_ts,
        )
        .await?;
    }
    Ok(resolved.id)
}

async fn record_creation_claim(
    txn: &mut dyn GraphTransaction,
    counter: &mut OpCounter<'_>,
    counters: &mut Counters,
    kind: EntityKind,
    target_id: &Id,
    field: &str,
    value: Value,
    event_hash: &str,
    event_ts: Timestamp,
) -> Result<()> {
    let claim = Claim {
        claim_id: counter.next_claim_id(),
        target_kind: kind,
        target_id: target_id.clone(),
        field: field.to_owned(),
        value: ClaimValue::from_json(value),
        event_hash: event_hash.to_owned(),
        created_at: event_ts,
        superseded_by: None,
        superseded_at: None,
        source: None,
    };
    txn.insert_claim(claim).await?;
    counters.claims += 1;
    Ok(())
}

/// Resolves a `recording_of` reference: an explicit id is honored, a
/// matching title in `song_ids_by_title` is reused, and a bare unmatched
/// string mints a fresh provisional song (§4.5 open question).
fn resolve_song_reference(
    counter: &mut OpCounter<'_>,
    song_ids_by_title: &HashMap<String, Id>,
    reference: &str,
) -> Option<Id> {
    match identity::parse_id(reference) {
        ParsedId::Canonical { .. } | ParsedId::Provisional { .. } | ParsedId::External { .. } => {
            Some(Id::new(reference))
        }
        ParsedId::Invalid => {
            if let Some(id) = song_ids_by_title.get(&reference.to_ascii_lowercase()) {
                Some(id.clone())
            } else {
                Some(Id::new(counter.next_provisional_song_id()))
            }
        }
    }
}

fn resolve_track_reference(reference: &str, track_ids: &HashMap<String, Id>) -> Option<Id> {
    track_ids.get(reference).cloned().or_else(|| match identity::parse_id(reference) {
        ParsedId::Canonical { .. } | ParsedId::Provisional { .. } | ParsedId::External { .. } => {
            Some(Id::new(reference))
        }
        ParsedId::Invalid => None,
    })
}

/// A stand-in [`IdentityMapStore`] that never resolves anything, used for
/// credits resolved without an enclosing identity-map scope (release-level
/// guests, which are looked up the same way as any other credited person).
struct NoopIdentityMap;

#[async_trait::async_trait]
impl IdentityMapStore for NoopIdentityMap {
    async fn resolve(
        &self,
        _source: &str,
        _kind: EntityKind,
        _external_id: &str,
    ) -> discograph_repo::RepoResult<Option<Id>> {
        Ok(None)
    }

    async fn insert_if_absent(
        &self,
        _source: &str,
        _kind: EntityKind,
        _external_id: &str,
        canonical_id: Id,
    ) -> discograph_repo::RepoResult<Id> {
        Ok(canonical_id)
    }
}

#[cfg(test)]
mod tests {
    use discograph_core_json::canonical::{
        CanonicalGroup, CanonicalMember, CanonicalPerformingGroup, CanonicalRelease,
        CanonicalTracklistItem,
    };
    use discograph_repo_memory::{InMemoryGraphStore, InMemoryIdentityMapStore};

    use super::*;

    fn sample_bundle() -> CanonicalBundle {
        CanonicalBundle {
            release: CanonicalRelease {
                name: "Abbey Road".to_owned(),
                release_date: Some("1969-09-26".to_owned()),
                catalog_number: Some("PCS 7088".to_owned()),
                guests: vec![],
                ..Default::default()
            },
            groups: vec![CanonicalGroup {
                name: "The Beatles".to_owned(),
                members: vec![CanonicalMember {
                    name: "John Lennon".to_owned(),
                    roles: vec!["vocals".to_owned()],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            tracks: vec![CanonicalTrack {
                track_id: "prov:track:come-together".to_owned(),
                title: "Come Together".to_owned(),
                duration: Some(259.0),
                performed_by_groups: vec![CanonicalPerformingGroup {
                    name: "The Beatles".to_owned(),
                    members_are_complete: true,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            tracklist: vec![CanonicalTracklistItem {
                position: "1".to_owned(),
                track_title: "Come Together".to_owned(),
                track_id: "prov:track:come-together".to_owned(),
                duration: Some(259.0),
            }],
            songs: vec![],
            sources: vec![],
        }
    }

    #[tokio::test]
    async fn projects_a_minimal_bundle_without_error() {
        let graph = InMemoryGraphStore::new();
        let identity_map = InMemoryIdentityMapStore::new();
        let bundle = sample_bundle();

        let outcome = project_bundle(
            &graph,
            &identity_map,
            "event-hash-1",
            &bundle,
            "submitter-account",
            Timestamp::from_millis(1_700_000_000_000),
        )
        .await
        .unwrap();

        assert!(outcome.created_node_count > 0);
        assert!(outcome.edge_count > 0);
    }

    #[tokio::test]
    async fn replaying_the_same_event_is_idempotent() {
        let graph = InMemoryGraphStore::new();
        let identity_map = InMemoryIdentityMapStore::new();
        let bundle = sample_bundle();

        let first = project_bundle(
            &graph,
            &identity_map,
            "event-hash-replay",
            &bundle,
            "submitter-account",
            Timestamp::from_millis(1_700_000_000_000),
        )
        .await
        .unwrap();
        let second = project_bundle(
            &graph,
            &identity_map,
            "event-hash-replay",
            &bundle,
            "submitter-account",
            Timestamp::from_millis(1_700_000_000_000),
        )
        .await
        .unwrap();

        assert_eq!(first.release_id, second.release_id);
    }
}
